use super::player::PlayerSession;
use super::recorder::RecorderSession;
use crate::native::{PermissionRequester, PlatformCapabilities, PlayerBackend, RecorderBackend};
use crate::options::OptionNormalizer;
use std::sync::Arc;

/// The one recorder and one player controller for a native surface
pub struct AudioBridge {
    pub recorder: RecorderSession,
    pub player: PlayerSession,
    capabilities: PlatformCapabilities,
}

impl AudioBridge {
    pub fn new(
        recorder: Arc<dyn RecorderBackend>,
        player: Arc<dyn PlayerBackend>,
        capabilities: PlatformCapabilities,
    ) -> Self {
        Self::with_normalizer(
            recorder,
            player,
            capabilities,
            OptionNormalizer::new(capabilities.convention),
        )
    }

    pub fn with_normalizer(
        recorder: Arc<dyn RecorderBackend>,
        player: Arc<dyn PlayerBackend>,
        capabilities: PlatformCapabilities,
        normalizer: OptionNormalizer,
    ) -> Self {
        Self {
            recorder: RecorderSession::new(recorder, capabilities).with_normalizer(normalizer.clone()),
            player: PlayerSession::new(player).with_normalizer(normalizer),
            capabilities,
        }
    }

    pub fn with_permissions(mut self, permissions: Arc<dyn PermissionRequester>) -> Self {
        self.recorder = self.recorder.with_permissions(permissions);
        self
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }
}
