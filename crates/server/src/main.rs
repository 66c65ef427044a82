use std::net::SocketAddr;

use axum::{
    extract::ws::{Message, WebSocket},
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Router,
};
use enclose_kernel::{
    error::{EvalError, ParseError, SampleError},
    expr::Expr,
    function::IntervalFunction,
    interval::Interval,
    parse::parse,
    sampler::{IntervalSampler, SamplingMode, DEFAULT_MAX_PIECES},
    support::first_unsupported,
    tuple::IntervalTuple,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, PartialEq)]
enum ConfigError {
    #[error("PORT must be a port number, got `{0}`")]
    Port(String),
    #[error("ENCLOSE_MAX_PIECES must be a positive integer, got `{0}`")]
    MaxPieces(String),
    #[error("`{0}` is not a valid listen address")]
    Address(String),
}

#[derive(Clone, Debug, PartialEq)]
struct ServerConfig {
    addr: SocketAddr,
    max_pieces: usize,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("PORT") {
            Some(v) => v.parse::<u16>().map_err(|_| ConfigError::Port(v))?,
            None => 8787,
        };
        let max_pieces = match lookup("ENCLOSE_MAX_PIECES") {
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::MaxPieces(v)),
            },
            None => DEFAULT_MAX_PIECES,
        };
        let addr = format!("{host}:{port}");
        let addr = addr.parse().map_err(|_| ConfigError::Address(addr))?;
        Ok(Self { addr, max_pieces })
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true))
        .with(filter)
        .init();
}

/// An expression given either as text or as a serialized tree.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExprInput {
    Text(String),
    Tree(Expr),
}

impl ExprInput {
    fn resolve(self) -> Result<Expr, ParseError> {
        match self {
            ExprInput::Text(text) => parse(&text),
            ExprInput::Tree(expr) => Ok(expr),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "cmd")]
enum Request {
    #[serde(rename = "eval")]
    Eval { expr: ExprInput, low: f64, high: f64 },
    #[serde(rename = "supported")]
    Supported { expr: ExprInput },
    #[serde(rename = "sample")]
    Sample {
        expr: ExprInput,
        low: f64,
        high: f64,
        pieces: usize,
    },
    #[serde(rename = "pan")]
    Pan { low: f64, high: f64 },
    #[serde(rename = "clear")]
    Clear,
}

/// `[low, high]`, or `null` for the undefined interval.
type Bounds = Option<[f64; 2]>;

fn bounds(v: Interval) -> Bounds {
    (!v.is_undefined()).then(|| [v.low(), v.high()])
}

#[derive(Debug, PartialEq, Serialize)]
struct Sample {
    x: [f64; 2],
    y: Bounds,
}

impl From<&IntervalTuple> for Sample {
    fn from(t: &IntervalTuple) -> Self {
        Self {
            x: [t.x().low(), t.x().high()],
            y: t.y().and_then(bounds),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "ok")]
enum Response {
    #[serde(rename = "eval")]
    Eval { value: Bounds },
    #[serde(rename = "supported")]
    Supported {
        supported: bool,
        unsupported: Option<String>,
    },
    #[serde(rename = "samples")]
    Samples {
        mode: SamplingMode,
        evaluated: usize,
        step: f64,
        samples: Vec<Sample>,
    },
    #[serde(rename = "cleared")]
    Cleared,
    #[serde(rename = "error")]
    Error { message: String },
}

#[derive(Error, Debug)]
enum RequestError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Sample(#[from] SampleError),
    #[error("nothing has been sampled yet")]
    NothingSampled,
}

/// Per-connection state: the sampler of the curve being viewed.
#[derive(Debug)]
struct Session {
    sampler: Option<IntervalSampler>,
    max_pieces: usize,
}

impl Session {
    fn new(max_pieces: usize) -> Self {
        Self {
            sampler: None,
            max_pieces,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let config = ServerConfig::from_env()?;
    let addr = config.addr;

    let app = Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .with_state(config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("enclose-server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn ws_handler(State(config): State<ServerConfig>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, config.max_pieces))
}

async fn handle_ws(mut socket: WebSocket, max_pieces: usize) {
    let mut session = Session::new(max_pieces);
    while let Some(Ok(msg)) = socket.next().await {
        if let Message::Text(text) = msg {
            let response = match serde_json::from_str::<Request>(&text) {
                Ok(req) => route_request(&mut session, req),
                Err(err) => {
                    warn!(%err, "bad request");
                    Response::Error {
                        message: format!("bad request: {err}"),
                    }
                }
            };
            let payload = match serde_json::to_string(&response) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(%err, "could not serialize response");
                    continue;
                }
            };
            if socket.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    }
    debug!("websocket closed");
}

fn route_request(session: &mut Session, req: Request) -> Response {
    handle(session, req).unwrap_or_else(|err| Response::Error {
        message: err.to_string(),
    })
}

fn handle(session: &mut Session, req: Request) -> Result<Response, RequestError> {
    match req {
        Request::Eval { expr, low, high } => {
            let function = IntervalFunction::new(expr.resolve()?)?;
            let value = function.evaluate(Interval::new(low, high))?;
            debug!(expr = %function.expr(), %value, "eval");
            Ok(Response::Eval { value: bounds(value) })
        }
        Request::Supported { expr } => {
            let unsupported = first_unsupported(&expr.resolve()?);
            Ok(Response::Supported {
                supported: unsupported.is_none(),
                unsupported: unsupported.map(|op| op.to_string()),
            })
        }
        Request::Sample {
            expr,
            low,
            high,
            pieces,
        } => {
            let sampler = IntervalSampler::with_max_pieces(
                expr.resolve()?,
                Interval::new(low, high),
                pieces,
                session.max_pieces,
            )?;
            let response = samples(&sampler, sampler.samples().count());
            session.sampler = Some(sampler);
            Ok(response)
        }
        Request::Pan { low, high } => {
            let sampler = session.sampler.as_mut().ok_or(RequestError::NothingSampled)?;
            let evaluated = sampler.pan(Interval::new(low, high))?;
            debug!(expr = %sampler.expr(), evaluated, "pan");
            Ok(samples(sampler, evaluated))
        }
        Request::Clear => {
            session.sampler = None;
            Ok(Response::Cleared)
        }
    }
}

fn samples(sampler: &IntervalSampler, evaluated: usize) -> Response {
    Response::Samples {
        mode: sampler.mode(),
        evaluated,
        step: sampler.step(),
        samples: sampler.samples().iter().map(Sample::from).collect(),
    }
}
