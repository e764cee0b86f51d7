use uuid::Uuid;

/// Environment variable pinning the machine identifier
pub const MACHINE_ID_ENV: &str = "TOKENSYNC_MACHINE_ID";

/// Identifier tagging every upload from this machine.
///
/// Priority: the id already stored with the checkpoint, then
/// `TOKENSYNC_MACHINE_ID`, then a fresh UUID v4 (which the caller persists
/// with the next checkpoint write).
pub fn machine_id(stored: Option<&str>) -> String {
    let env_id = std::env::var(MACHINE_ID_ENV).ok();
    machine_id_from(stored, env_id.as_deref())
}

pub fn machine_id_from(stored: Option<&str>, env_id: Option<&str>) -> String {
    [stored, env_id]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_id_is_stable() {
        assert_eq!(machine_id_from(Some("m-1"), Some("env")), "m-1");
        assert_eq!(machine_id_from(None, Some("env")), "env");
    }

    #[test]
    fn test_fresh_id_is_uuid() {
        let id = machine_id_from(Some("  "), None);
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
