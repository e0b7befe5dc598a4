use async_trait::async_trait;
use gomibi_core::ports::{Delivery, RelayError, RelayPort};

/// Relay that prints messages instead of posting them.
pub(crate) struct DryRunRelay;

#[async_trait]
impl RelayPort for DryRunRelay {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn send(&self, message: &str) -> Result<Delivery, RelayError> {
        println!("{message}");
        Ok(Delivery::Sent { status: 200 })
    }
}
