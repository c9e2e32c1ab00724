use std::sync::Arc;

use crate::app::{AppContext, FullfeedError, Result};
use crate::config::{Config, ServerConfig};
use crate::server;

pub async fn serve(ctx: AppContext, server_config: &ServerConfig) -> Result<()> {
    let addr = server_config
        .socket_addr()
        .map_err(|e| FullfeedError::Config(e.to_string()))?;

    server::serve(Arc::new(ctx), addr).await
}

pub async fn transform(ctx: &AppContext, url: &str) -> Result<()> {
    let xml = ctx.proxy_feed(url).await?;
    print!("{}", xml);
    Ok(())
}

pub fn print_default_config() {
    print!("{}", Config::default_config_content());
}
