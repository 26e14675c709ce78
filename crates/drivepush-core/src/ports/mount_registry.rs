//! Mount registry port

use crate::domain::MountPoint;

/// Detaches mount points attached for the duration of a push
#[async_trait::async_trait]
pub trait IMountRegistry: Send + Sync {
    async fn clear(&self, points: &[MountPoint]) -> anyhow::Result<()>;
}
