// ABOUTME: Package command implementation.
// ABOUTME: Builds or locates the revision archive and prints its path.

use revdeploy::config::Config;
use revdeploy::error::Result;
use revdeploy::listener::PackagingLogger;
use revdeploy::output::{Output, OutputListener};
use revdeploy::revision::ArchiveBuilder;
use std::path::Path;
use std::sync::Arc;

/// Build the revision archive described by the configuration.
pub fn package(config: Config, dir: &Path, mut output: Output) -> Result<()> {
    config.validate_packaging()?;
    output.start_timer();

    let spec = config.revision_spec(dir);
    output.progress(&format!(
        "Packaging revision {} from {}",
        spec.name,
        spec.base_dir.display()
    ));

    let listener = Arc::new(OutputListener::new(output, config.identity(dir)));
    let logger: Arc<dyn PackagingLogger> = listener.clone();
    let archive = ArchiveBuilder::new(spec).with_logger(logger).build()?;

    listener
        .output()
        .success(&archive.display().to_string());
    Ok(())
}
