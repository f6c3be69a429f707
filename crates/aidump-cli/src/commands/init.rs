use anyhow::Result;

use super::Context;

pub fn handle(ctx: &Context) -> Result<()> {
    let path = aidump_config::init(&ctx.project_root)?;

    println!("✓ Created {}", path.display());
    println!("  Edit it to adjust the blacklist, whitelist and env masking");
    Ok(())
}
