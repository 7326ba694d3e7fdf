use std::{
    collections::HashMap,
    error::Error,
    fmt::Display,
    io,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use log::{debug, warn};
use serde_json::{json, Value};
use tokio::{
    io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    select,
    sync::{
        broadcast::{error::RecvError, Receiver},
        mpsc::{unbounded_channel, UnboundedSender},
    },
    task::JoinHandle,
};

use crate::{
    message::{GameArguments, MoveArguments, Request, Response},
    room::{GameView, Lobby, RoomError},
};

/// Games one connection follows, each with the task forwarding its updates.
/// The tasks are stopped when the connection goes away.
pub struct Subscriptions {
    updates: UnboundedSender<Response>,
    tasks: HashMap<String, JoinHandle<()>>,
}

impl Subscriptions {
    pub fn new(updates: UnboundedSender<Response>) -> Self {
        Subscriptions {
            updates,
            tasks: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn contains(&self, game_id: &str) -> bool {
        self.tasks.contains_key(game_id)
    }

    fn forward(&mut self, game_id: String, mut receiver: Receiver<GameView>) {
        let updates = self.updates.clone();
        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(view) => {
                        let Ok(data) = serde_json::to_value(view) else {
                            continue;
                        };
                        if updates.send(Response::update(data)).is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => warn!("subscriber skipped {skipped} updates"),
                    Err(RecvError::Closed) => break,
                }
            }
        });
        self.tasks.insert(game_id, task);
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.abort();
        }
    }
}

/// Accept connections until the listener fails.
pub async fn serve(listener: TcpListener, lobby: Arc<Mutex<Lobby>>) -> io::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        debug!("{addr} connected");
        let lobby = Arc::clone(&lobby);
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, lobby).await {
                warn!("connection to {addr} failed: {err}");
            }
            debug!("{addr} disconnected");
        });
    }
}

/// Answer requests line by line and forward updates of subscribed games.
pub async fn handle_connection(stream: TcpStream, lobby: Arc<Mutex<Lobby>>) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    let (updates, mut pushed) = unbounded_channel();
    let mut subscriptions = Subscriptions::new(updates);

    loop {
        select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response = handle_request(&line, &lobby, &mut subscriptions);
                write_response(&mut writer, &response).await?;
            }
            Some(update) = pushed.recv() => write_response(&mut writer, &update).await?,
        }
    }
    debug!("closing connection with {} subscriptions", subscriptions.len());
    Ok(())
}

async fn write_response(writer: &mut (impl AsyncWrite + Unpin), response: &Response) -> io::Result<()> {
    let mut line = serde_json::to_vec(response)?;
    line.push(b'\n');
    writer.write_all(&line).await
}

pub fn handle_request(line: &str, lobby: &Mutex<Lobby>, subscriptions: &mut Subscriptions) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(err) => return Response::err("", None, RequestError::Json(err)),
    };
    // clients may address actions like routes
    let action = request.action.trim_start_matches('/');
    match dispatch(action, &request, lobby, subscriptions) {
        Ok(data) => Response::ok(action, request.msg_id, data),
        Err(err) => {
            debug!("{action} failed: {err}");
            Response::err(action, request.msg_id, err)
        }
    }
}

fn dispatch(
    action: &str,
    request: &Request,
    lobby: &Mutex<Lobby>,
    subscriptions: &mut Subscriptions,
) -> Result<Option<Value>, RequestError> {
    match action {
        "ping" => Ok(None),
        "startNewGame" => {
            let (game_id, game_key) = lock(lobby).create();
            Ok(Some(json!({ "gameId": game_id, "gameKey": game_key })))
        }
        "viewGame" => {
            let arguments: GameArguments = serde_json::from_value(request.arguments.clone())?;
            let view = lock(lobby).view(&arguments.game_id)?;
            Ok(Some(serde_json::to_value(view)?))
        }
        "makeMove" => {
            let arguments: MoveArguments = serde_json::from_value(request.arguments.clone())?;
            let key = request.game_key.as_deref().or(arguments.game_key.as_deref());
            let view = lock(lobby).make_move(&arguments.game_id, key, arguments.move_position)?;
            Ok(Some(serde_json::to_value(view)?))
        }
        "subscribe" => {
            let arguments: GameArguments = serde_json::from_value(request.arguments.clone())?;
            // subscribing again changes nothing
            if !subscriptions.contains(&arguments.game_id) {
                let receiver = {
                    let lobby = lock(lobby);
                    let receiver = lobby.subscribe(&arguments.game_id)?;
                    let count = lobby.subscribers(&arguments.game_id)?;
                    debug!("game {} has {count} subscribers", arguments.game_id);
                    receiver
                };
                subscriptions.forward(arguments.game_id, receiver);
            }
            Ok(None)
        }
        _ => Err(RequestError::UnknownAction(action.to_owned())),
    }
}

fn lock(lobby: &Mutex<Lobby>) -> MutexGuard<'_, Lobby> {
    lobby.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub enum RequestError {
    Json(serde_json::Error),
    Room(RoomError),
    UnknownAction(String),
}

impl Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::Json(err) => write!(f, "malformed request: {err}"),
            RequestError::Room(err) => err.fmt(f),
            RequestError::UnknownAction(action) => write!(f, "unknown action \"{action}\""),
        }
    }
}

impl Error for RequestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RequestError::Json(err) => Some(err),
            RequestError::Room(err) => Some(err),
            RequestError::UnknownAction(_) => None,
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(e: serde_json::Error) -> Self {
        RequestError::Json(e)
    }
}

impl From<RoomError> for RequestError {
    fn from(e: RoomError) -> Self {
        RequestError::Room(e)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use policy::Solver;
    use serde_json::{json, Value};
    use tictactoe::Rules;
    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
        net::{tcp::OwnedReadHalf, tcp::OwnedWriteHalf, TcpListener, TcpStream},
        sync::mpsc::unbounded_channel,
        time::{sleep, timeout},
    };

    use super::{handle_request, lock, serve, Subscriptions};
    use crate::room::Lobby;

    fn lobby() -> Mutex<Lobby> {
        Mutex::new(Lobby::new(Rules::default(), Solver::default()))
    }

    fn request(lobby: &Mutex<Lobby>, line: &str) -> Value {
        let (updates, _) = unbounded_channel();
        let mut subscriptions = Subscriptions::new(updates);
        serde_json::to_value(handle_request(line, lobby, &mut subscriptions)).unwrap()
    }

    #[tokio::test]
    async fn subscribing_twice_pushes_once() {
        let lobby = lobby();
        let (updates, mut pushed) = unbounded_channel();
        let mut subscriptions = Subscriptions::new(updates);
        let created = handle_request(r#"{"action":"startNewGame"}"#, &lobby, &mut subscriptions);
        let key = created.data.unwrap()["gameKey"].as_str().unwrap().to_owned();

        for _ in 0..2 {
            let response = handle_request(
                r#"{"action":"subscribe","arguments":{"gameId":"1"}}"#,
                &lobby,
                &mut subscriptions,
            );
            assert!(response.success);
        }
        assert_eq!(subscriptions.len(), 1);
        assert_eq!(lock(&lobby).subscribers("1").unwrap(), 1);

        let line = json!({
            "action": "makeMove",
            "arguments": {"gameId": "1", "movePosition": 4},
            "gameKey": key,
        });
        assert!(handle_request(&line.to_string(), &lobby, &mut subscriptions).success);
        let update = pushed.recv().await.unwrap();
        assert_eq!(update.action, "gameUpdate");
        assert!(timeout(Duration::from_millis(50), pushed.recv()).await.is_err());
    }

    #[test]
    fn failed_subscriptions_are_not_kept() {
        let lobby = lobby();
        let (updates, _pushed) = unbounded_channel();
        let mut subscriptions = Subscriptions::new(updates);
        let response = handle_request(
            r#"{"action":"subscribe","arguments":{"gameId":"3"}}"#,
            &lobby,
            &mut subscriptions,
        );
        assert!(!response.success);
        assert!(!subscriptions.contains("3"));
    }

    #[test]
    fn ping() {
        let response = request(&lobby(), r#"{"action":"ping","msgId":"a1"}"#);
        assert_eq!(response, json!({"action": "ping", "msgId": "a1", "success": true}));
    }

    #[test]
    fn bad_requests_fail() {
        let lobby = lobby();
        assert_eq!(request(&lobby, "{not json")["success"], false);
        let response = request(&lobby, r#"{"action":"dance","msgId":"b"}"#);
        assert_eq!(response["success"], false);
        assert_eq!(response["msgId"], "b");
        assert_eq!(response["error"], "unknown action \"dance\"");
        let response = request(&lobby, r#"{"action":"viewGame","arguments":{}}"#);
        assert_eq!(response["success"], false);
        let response = request(&lobby, r#"{"action":"viewGame","arguments":{"gameId":"5"}}"#);
        assert_eq!(response["error"], "there is no game 5");
    }

    #[test]
    fn key_may_come_with_the_arguments() {
        let lobby = lobby();
        let created = request(&lobby, r#"{"action":"/startNewGame"}"#);
        assert_eq!(created["action"], "startNewGame");
        let key = created["data"]["gameKey"].as_str().unwrap();

        let line = json!({
            "action": "/makeMove",
            "arguments": {"gameId": "1", "movePosition": 4, "gameKey": key},
        });
        let response = request(&lobby, &line.to_string());
        assert_eq!(response["success"], true);
        assert_eq!(response["data"]["moves"].as_array().unwrap().len(), 2);

        let line = json!({
            "action": "makeMove",
            "arguments": {"gameId": "1", "movePosition": 0},
            "gameKey": "wrong",
        });
        assert_eq!(request(&lobby, &line.to_string())["error"], "wrong game key");
    }

    struct Client {
        lines: Lines<BufReader<OwnedReadHalf>>,
        writer: OwnedWriteHalf,
    }

    impl Client {
        async fn send(&mut self, message: Value) -> Value {
            self.writer.write_all(format!("{message}\n").as_bytes()).await.unwrap();
            self.receive().await
        }

        async fn receive(&mut self) -> Value {
            let line = self.lines.next_line().await.unwrap().unwrap();
            serde_json::from_str(&line).unwrap()
        }
    }

    #[tokio::test]
    async fn play_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, Arc::new(lobby())));

        let (reader, writer) = TcpStream::connect(addr).await.unwrap().into_split();
        let mut client = Client {
            lines: BufReader::new(reader).lines(),
            writer,
        };

        let created = client.send(json!({"action": "startNewGame", "msgId": "1"})).await;
        assert_eq!(created["success"], true);
        let game_id = created["data"]["gameId"].clone();
        let game_key = created["data"]["gameKey"].clone();

        let subscribed = client
            .send(json!({"action": "subscribe", "arguments": {"gameId": game_id}, "msgId": "2"}))
            .await;
        assert_eq!(subscribed["success"], true);

        let moved = client
            .send(json!({
                "action": "makeMove",
                "arguments": {"gameId": game_id, "movePosition": 0},
                "msgId": "3",
                "gameKey": game_key,
            }))
            .await;
        assert_eq!(moved["msgId"], "3");
        assert_eq!(moved["data"]["moves"][1]["movePosition"], 8);
        assert_eq!(moved["data"]["moves"][1]["player"], "bot");

        let update = client.receive().await;
        assert_eq!(update["action"], "gameUpdate");
        assert_eq!(update["data"], moved["data"]);

        let viewed = client
            .send(json!({"action": "viewGame", "arguments": {"gameId": game_id}, "msgId": "4"}))
            .await;
        assert_eq!(viewed["data"], moved["data"]);
        assert_eq!(viewed["data"]["gameState"], json!({"finished": false, "winner": null}));
    }

    #[tokio::test]
    async fn closed_connections_stop_forwarding() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let lobby = Arc::new(lobby());
        tokio::spawn(serve(listener, Arc::clone(&lobby)));

        let (reader, writer) = TcpStream::connect(addr).await.unwrap().into_split();
        let mut client = Client {
            lines: BufReader::new(reader).lines(),
            writer,
        };
        client.send(json!({"action": "startNewGame"})).await;
        client
            .send(json!({"action": "subscribe", "arguments": {"gameId": "1"}}))
            .await;
        assert_eq!(lock(&lobby).subscribers("1").unwrap(), 1);

        drop(client);
        for _ in 0..100 {
            if lock(&lobby).subscribers("1").unwrap() == 0 {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("the forwarding task outlived its connection");
    }
}
