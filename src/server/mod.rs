//! An MCP server exposing presentation editing tools.
//!
//! Open presentations live in a single store shared by every connection. Tool calls lock it for
//! their whole duration so they're serialized, and run on the blocking pool since they read and
//! write files. TCP clients are served one connection at a time.

mod error;
mod session;
mod tools;

pub use error::ToolCallError;

use crate::design::{DesignSystem, StyleError, StyleResolver};
use mcp_server::{
    router::{CapabilitiesBuilder, RouterService},
    ByteTransport, Router, Server,
};
use mcp_spec::{
    content::Content,
    handler::{PromptError, ResourceError, ToolError},
    protocol::ServerCapabilities,
    prompt::Prompt,
    resource::Resource,
    tool::Tool,
};
use serde_json::Value;
use session::PresentationStore;
use std::{
    future::Future,
    path::PathBuf,
    pin::Pin,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::{
    io::{stdin, stdout},
    net::TcpListener,
    task,
};
use tools::ToolName;
use tracing::{debug, info, instrument, warn};

/// The state shared by every tool call.
#[derive(Debug)]
pub struct ServerState {
    design: DesignSystem,
    store: Mutex<PresentationStore>,
    output_dir: PathBuf,
}

impl ServerState {
    pub fn new<P: Into<PathBuf>>(design: DesignSystem, output_dir: P) -> Self {
        Self { design, store: Default::default(), output_dir: output_dir.into() }
    }

    fn store(&self) -> MutexGuard<'_, PresentationStore> {
        // A panicking tool call can't leave the store half updated.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolver(&self, theme: Option<&str>) -> Result<StyleResolver<'_>, StyleError> {
        let resolver = self.design.resolver();
        match theme {
            Some(theme) => resolver.with_theme(theme),
            None => Ok(resolver),
        }
    }

    // Relative output paths live in the output directory.
    fn resolve_output(&self, path: PathBuf) -> PathBuf {
        if path.is_relative() { self.output_dir.join(path) } else { path }
    }
}

/// Routes MCP requests to the tools.
#[derive(Clone, Debug)]
pub struct SlideRouter {
    state: Arc<ServerState>,
}

impl SlideRouter {
    pub fn new(state: ServerState) -> Self {
        Self { state: Arc::new(state) }
    }
}

impl Router for SlideRouter {
    fn name(&self) -> String {
        env!("CARGO_PKG_NAME").to_string()
    }

    fn instructions(&self) -> String {
        let names: Vec<_> = tools::tools().into_iter().map(|tool| tool.name).collect();
        format!(
            "Creates and edits .pptx presentations styled by a design system. Create or open a presentation to \
            get its id, add slides to it and save it. Available tools: {}",
            names.join(", ")
        )
    }

    fn capabilities(&self) -> ServerCapabilities {
        CapabilitiesBuilder::new().with_tools(false).with_resources(false, false).build()
    }

    fn list_tools(&self) -> Vec<Tool> {
        tools::tools()
    }

    #[instrument(skip(self, arguments), fields(tool = %tool_name))]
    fn call_tool(
        &self,
        tool_name: &str,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Content>, ToolError>> + Send + 'static>> {
        debug!(args = ?arguments, "tool called");
        let state = self.state.clone();
        let tool_name = tool_name.to_string();
        Box::pin(async move {
            let tool = ToolName::from_str(&tool_name).map_err(|_| ToolCallError::UnknownTool(tool_name.clone()))?;
            let result = task::spawn_blocking(move || state.call(tool, arguments))
                .await
                .map_err(|e| ToolError::ExecutionError(format!("tool call aborted: {e}")))?;
            match result {
                Ok(result) => {
                    info!(tool = %tool_name, "tool executed");
                    let text = serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string());
                    Ok(vec![Content::text(text)])
                }
                Err(e) => {
                    warn!(tool = %tool_name, error = %e, "tool failed");
                    Err(e.into())
                }
            }
        })
    }

    fn list_resources(&self) -> Vec<Resource> {
        vec![]
    }

    fn read_resource(
        &self,
        uri: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ResourceError>> + Send + 'static>> {
        let uri = uri.to_string();
        Box::pin(async move { Err(ResourceError::NotFound(uri)) })
    }

    fn list_prompts(&self) -> Vec<Prompt> {
        vec![]
    }

    fn get_prompt(
        &self,
        prompt_name: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String, PromptError>> + Send + 'static>> {
        let prompt_name = prompt_name.to_string();
        Box::pin(async move { Err(PromptError::NotFound(prompt_name)) })
    }
}

/// Serve requests over stdin/stdout until the client disconnects.
pub async fn serve_stdio(router: SlideRouter) -> anyhow::Result<()> {
    info!("serving on stdio");
    let server = Server::new(RouterService(router));
    let transport = ByteTransport::new(stdin(), stdout());
    server.run(transport).await?;
    Ok(())
}

/// Serve requests over TCP, one connection after the other.
///
/// A connection is served until its client disconnects, and only then is the next one accepted.
pub async fn serve_tcp(router: SlideRouter, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    info!(address = %listener.local_addr()?, "listening");
    serve_listener(router, listener).await
}

async fn serve_listener(router: SlideRouter, listener: TcpListener) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(peer = %peer, "connection accepted");
        let (reader, writer) = stream.into_split();
        let server = Server::new(RouterService(router.clone()));
        match server.run(ByteTransport::new(reader, writer)).await {
            Ok(()) => debug!(peer = %peer, "connection closed"),
            Err(e) => warn!(peer = %peer, error = %e, "connection failed"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pptx::Presentation;
    use serde_json::json;

    fn router() -> SlideRouter {
        let dir = std::env::temp_dir().join("slidewright-router-test");
        SlideRouter::new(ServerState::new(DesignSystem::default(), dir))
    }

    #[test]
    fn lists_tools() {
        let router = router();
        assert_eq!(router.list_tools().len(), 8);
        assert!(router.instructions().contains("generate_from_template"));
        assert_eq!(router.name(), "slidewright");
    }

    #[tokio::test]
    async fn call_tool() {
        let router = router();
        let content = router.call_tool("create_presentation", json!({})).await.expect("call failed");
        assert_eq!(content.len(), 1);

        let error = router.call_tool("make_coffee", json!({})).await.expect_err("call succeeded");
        assert!(matches!(error, ToolError::NotFound(_)));

        let error = router.call_tool("save_presentation", json!({})).await.expect_err("call succeeded");
        assert!(matches!(error, ToolError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn call_tool_saves_files() {
        let dir = tempfile::tempdir().expect("no temp dir");
        let router = SlideRouter::new(ServerState::new(DesignSystem::default(), dir.path()));
        router.call_tool("create_presentation", json!({})).await.expect("create failed");
        let arguments = json!({"presentation_id": "pres_1", "title": "Hello"});
        router.call_tool("add_slide_to_presentation", arguments).await.expect("add slide failed");

        let arguments = json!({"presentation_id": "pres_1", "file_path": "saved.pptx"});
        router.call_tool("save_presentation", arguments).await.expect("save failed");
        let presentation = Presentation::open(dir.path().join("saved.pptx")).expect("open failed");
        assert_eq!(presentation.slides()[0].title().as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn serve_connections_in_turn() {
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
        use tokio::net::TcpStream;

        let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind failed");
        let address = listener.local_addr().expect("no address");
        let client = async {
            for id in 1..=2 {
                let stream = TcpStream::connect(address).await.expect("connect failed");
                let (reader, mut writer) = stream.into_split();
                let request = format!("{{\"jsonrpc\":\"2.0\",\"id\":{id},\"method\":\"tools/list\"}}\n");
                writer.write_all(request.as_bytes()).await.expect("write failed");
                let mut line = String::new();
                BufReader::new(reader).read_line(&mut line).await.expect("read failed");
                let response: Value = serde_json::from_str(&line).expect("invalid response");
                assert_eq!(response["id"], id);
                assert_eq!(response["result"]["tools"].as_array().map(Vec::len), Some(8));
            }
        };
        tokio::select! {
            result = serve_listener(router(), listener) => panic!("server stopped: {result:?}"),
            _ = client => (),
        }
    }

    #[test]
    fn resolve_output() {
        let state = ServerState::new(DesignSystem::default(), "/srv/out");
        assert_eq!(state.resolve_output("a.pptx".into()), PathBuf::from("/srv/out/a.pptx"));
        assert_eq!(state.resolve_output("/tmp/a.pptx".into()), PathBuf::from("/tmp/a.pptx"));
    }
}
