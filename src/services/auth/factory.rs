/// Factory: build `ClaimsCodec` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::ClaimsCodec;

pub fn build_claims_codec(config: &Config) -> Arc<ClaimsCodec> {
    let codec = ClaimsCodec::new(&config.signing);
    tracing::debug!(?codec, "claims codec ready");
    Arc::new(codec)
}
