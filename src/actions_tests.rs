// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `actions.rs`

#[cfg(test)]
mod tests {
    use crate::actions::{storage_probe_pod, storage_probe_pvc, unique_namespace};
    use crate::constants::{MAX_NAMESPACE_LEN, STORAGE_PROBE_PVC};

    #[test]
    fn test_unique_namespace_is_dns_label() {
        let name = unique_namespace("e2e");

        assert!(name.starts_with("e2e-"), "name: {name}");
        assert!(name.len() <= MAX_NAMESPACE_LEN);
        assert!(name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        assert!(!name.ends_with('-'));
    }

    #[test]
    fn test_unique_namespace_sanitizes_prefix() {
        let name = unique_namespace("My_Suite.Storage");
        assert!(name.starts_with("mysuitestorage-"), "name: {name}");
    }

    #[test]
    fn test_unique_namespace_truncates_long_prefix() {
        let name = unique_namespace(&"x".repeat(100));
        assert_eq!(name.len(), MAX_NAMESPACE_LEN);
    }

    #[test]
    fn test_storage_probe_pvc_uses_class_when_given() {
        let pvc = storage_probe_pvc(Some("gp3")).unwrap();
        let spec = pvc.spec.unwrap();

        assert_eq!(pvc.metadata.name.as_deref(), Some(STORAGE_PROBE_PVC));
        assert_eq!(spec.storage_class_name.as_deref(), Some("gp3"));
        assert_eq!(spec.access_modes, Some(vec!["ReadWriteOnce".to_string()]));
    }

    #[test]
    fn test_storage_probe_pvc_defaults_class() {
        let pvc = storage_probe_pvc(None).unwrap();
        assert!(pvc.spec.unwrap().storage_class_name.is_none());
    }

    #[test]
    fn test_storage_probe_pod_mounts_pvc() {
        let pod = storage_probe_pod().unwrap();
        let spec = pod.spec.unwrap();
        let volumes = spec.volumes.unwrap();

        assert_eq!(volumes.len(), 1);
        assert_eq!(
            volumes[0]
                .persistent_volume_claim
                .as_ref()
                .map(|c| c.claim_name.as_str()),
            Some(STORAGE_PROBE_PVC)
        );
        assert_eq!(spec.containers.len(), 1);
    }
}
