//! Caller/target bitness detection

use crate::core::types::{BitnessRelationship, CmdlineError, CmdlineResult, Hop};
use crate::native::{InfoClass, NativeApi};
use tracing::debug;

/// Detects how the caller's architecture relates to a target's
pub struct BitnessDetector<'a, A: NativeApi> {
    api: &'a A,
}

impl<'a, A: NativeApi> BitnessDetector<'a, A> {
    /// Create a new detector over a native API
    pub fn new(api: &'a A) -> Self {
        BitnessDetector { api }
    }

    /// Query if a process is WoW64 (32-bit on 64-bit Windows)
    pub fn is_wow64(&self, process: A::Handle) -> CmdlineResult<bool> {
        // ProcessWow64Information writes a ULONG_PTR sized for the caller
        let mut wow64_peb = vec![0u8; self.api.native_width().pointer_size()];
        self.api
            .query_information_process(process, InfoClass::Wow64Information, &mut wow64_peb)
            .map_err(|cause| CmdlineError::from_native(Hop::DetectBitness, cause))?;
        Ok(wow64_peb.iter().any(|&b| b != 0))
    }

    /// Determine the relationship between the calling process and `process`
    pub fn detect(&self, process: A::Handle) -> CmdlineResult<BitnessRelationship> {
        let caller_is_wow64 = self.is_wow64(self.api.current_process())?;
        let target_is_wow64 = self.is_wow64(process)?;
        let relationship =
            BitnessRelationship::from_wow64_flags(caller_is_wow64, target_is_wow64);

        debug!(
            caller_is_wow64,
            target_is_wow64,
            %relationship,
            "detected bitness relationship"
        );
        Ok(relationship)
    }
}
