//! `api` command: run the HTTP resource interface in the foreground.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use crate::api::{self, ApiContext};
use crate::cli::ApiArgs;
use crate::store::RecordStore;

use super::CommandError;

pub async fn run(store: Arc<dyn RecordStore>, args: &ApiArgs) -> Result<(), CommandError> {
    let host: IpAddr = args.host.parse()?;
    let addr = SocketAddr::new(host, args.port);
    println!("Starting API server on http://{}:{}", args.host, args.port);
    api::server::serve(ApiContext::new(store), addr)
        .await
        .map_err(CommandError::Server)
}
