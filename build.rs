use anyhow::Result;
use vergen::EmitBuilder;

fn main() -> Result<()> {
    // git information is unavailable when building from a crate archive
    if EmitBuilder::builder()
        .git_branch()
        .git_sha(true)
        .fail_on_error()
        .quiet()
        .emit()
        .is_err()
    {
        println!("cargo:warning=no git revision information available");
    }
    Ok(())
}
