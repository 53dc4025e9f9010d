//! Ledger state persistence (bincode)

use anyhow::{Context, Result};
use bookkeeper::LedgerState;
use std::path::Path;

/// Restore a snapshot; `None` when the file does not exist yet
pub fn load(path: &str) -> Result<Option<LedgerState>> {
    let expanded_path = shellexpand::tilde(path);
    let path_ref = Path::new(expanded_path.as_ref());
    if !path_ref.exists() {
        return Ok(None);
    }

    let bytes = std::fs::read(path_ref)
        .context(format!("Failed to read snapshot from {}", path))?;
    let state: LedgerState = bincode::deserialize(&bytes)
        .context(format!("Failed to decode snapshot {}", path))?;

    log::info!("Restored ledger snapshot from {} ({} bytes)", path, bytes.len());
    Ok(Some(state))
}

pub fn save(path: &str, state: &LedgerState) -> Result<()> {
    let expanded_path = shellexpand::tilde(path);
    let bytes = bincode::serialize(state).context("Failed to encode snapshot")?;
    std::fs::write(expanded_path.as_ref(), &bytes)
        .context(format!("Failed to write snapshot to {}", path))?;

    log::info!("Saved ledger snapshot to {} ({} bytes)", path, bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookkeeper::{rad, wad, Address, Ledger, PoolId, Role, Signed};

    #[test]
    fn test_snapshot_preserves_state() {
        let owner = Address::new([1; 32]);
        let pool = PoolId::from_label("ETH-A").unwrap();
        let mut ledger = Ledger::new(owner);
        ledger.grant_role(owner, Role::Adapter, owner).unwrap();
        ledger.init_pool(owner, pool).unwrap();
        ledger.set_total_debt_ceiling(owner, rad(42)).unwrap();
        ledger.add_collateral(owner, pool, owner, Signed::wad(7)).unwrap();
        ledger.whitelist(owner, Address::new([2; 32]));
        ledger.cage(owner).unwrap();

        let path = std::env::temp_dir().join(format!("bookkeeper-snapshot-{}.bin", std::process::id()));
        let path = path.to_string_lossy().to_string();
        save(&path, ledger.state()).unwrap();
        let restored = load(&path).unwrap().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(&restored, ledger.state());
        assert_eq!(restored.collateral_balance(&pool, &owner), wad(7));
        assert!(!restored.live);
    }

    #[test]
    fn test_snapshot_restores_unlabelled_pool() {
        let owner = Address::new([1; 32]);
        let mut ledger = Ledger::new(owner);
        for pool in [PoolId::from_label("ÉTH-A").unwrap(), PoolId::from_label("").unwrap()] {
            ledger.init_pool(owner, pool).unwrap();
        }

        let path = std::env::temp_dir()
            .join(format!("bookkeeper-snapshot-tags-{}.bin", std::process::id()));
        let path = path.to_string_lossy().to_string();
        save(&path, ledger.state()).unwrap();
        let restored = load(&path).unwrap().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(&restored, ledger.state());
    }

    #[test]
    fn test_missing_snapshot_is_none() {
        assert!(load("/nonexistent/bookkeeper/snapshot.bin").unwrap().is_none());
    }
}
