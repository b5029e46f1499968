//! Exit codes for the CLI

#![allow(dead_code)]

use gantry_core::types::PublishStage;

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error (bad config, unstampable metadata)
pub const CONFIG_ERROR: i32 = 2;

/// Trigger error (empty ref, missing manual version)
pub const TRIGGER_ERROR: i32 = 3;

/// Build error (packaging layout, provisioning)
pub const BUILD_ERROR: i32 = 4;

/// Upload error (authentication, duplicate version, network)
pub const UPLOAD_ERROR: i32 = 5;

/// Validation error
pub const VALIDATION_ERROR: i32 = 6;

/// Exit code for a run that failed at the given stage
pub fn for_failed_stage(stage: PublishStage) -> i32 {
    match stage {
        PublishStage::DeriveVersion => TRIGGER_ERROR,
        PublishStage::StampMetadata => CONFIG_ERROR,
        PublishStage::Provision | PublishStage::Build => BUILD_ERROR,
        PublishStage::Upload => UPLOAD_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_exit_codes_are_distinct_and_nonzero() {
        let codes: Vec<i32> = PublishStage::all()
            .iter()
            .map(|s| for_failed_stage(*s))
            .collect();
        assert!(codes.iter().all(|c| *c != SUCCESS));
        assert_eq!(for_failed_stage(PublishStage::Upload), UPLOAD_ERROR);
        assert_eq!(for_failed_stage(PublishStage::StampMetadata), CONFIG_ERROR);
    }
}
