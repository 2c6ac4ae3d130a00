use crate::cli::ReinsertArgs;
use crate::error::Result;
use evodesign::core::codec::reinsert::restore_sequence;
use evodesign::core::models::mask::MutabilityMask;
use tracing::debug;

pub async fn run(args: ReinsertArgs) -> Result<()> {
    let mask: MutabilityMask = args.mask.parse()?;
    let restored = restore_sequence(args.sequence.trim(), &mask)?;
    debug!(deletions = mask.deletion_positions().count(), "Restored deletion placeholders.");
    println!("{}", restored);
    Ok(())
}
