use async_trait::async_trait;
use graph_chatbot::agent::ChatAgent;
use graph_chatbot::error::{ ChatError, GenerationError, GraphError };
use graph_chatbot::llm::chat::echo::EchoChatClient;
use graph_chatbot::llm::chat::ChatClient;
use graph_chatbot::llm::LlmType;
use graph_chatbot::models::chat::{ ChatMessage, Role };
use graph_chatbot::repl::{ Repl, ReplOptions, SessionEnd };
use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::{ Arc, Mutex };
use std::task::{ Context, Poll };
use tokio::io::{ AsyncRead, BufReader, ReadBuf };

/// Replies from a script and records every history it was sent.
#[derive(Default)]
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
        let replies = replies
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        Arc::new(Self { replies: Mutex::new(replies), calls: Mutex::new(Vec::new()) })
    }

    fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatMessage, GenerationError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(ChatMessage::assistant(text)),
            Some(Err(reason)) => Err(GenerationError::Provider(reason)),
            None => Err(GenerationError::EmptyResponse),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }

    fn llm_type(&self) -> LlmType {
        LlmType::Echo
    }
}

/// Input that fails every read, counting attempts.
struct BrokenInput {
    reads: Arc<AtomicUsize>,
}

impl AsyncRead for BrokenInput {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>
    ) -> Poll<io::Result<()>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "no terminal attached")))
    }
}

fn repl_with(client: Arc<dyn ChatClient>, options: ReplOptions) -> Repl {
    Repl::new(ChatAgent::with_client(client, None).unwrap(), options)
}

async fn run_session(repl: &mut Repl, input: &str) -> (Result<SessionEnd, ChatError>, String) {
    let mut out = Vec::new();
    let result = repl.run(input.as_bytes(), &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn hello_then_exit_makes_one_call() {
    let client = ScriptedClient::new(vec![Ok("Hi there!")]);
    let mut repl = repl_with(client.clone(), ReplOptions::default());

    let (result, out) = run_session(&mut repl, "Hello\nexit\n").await;

    assert_eq!(result.unwrap(), SessionEnd::Quit);
    assert_eq!(client.calls(), vec![vec![ChatMessage::user("Hello")]]);
    assert_eq!(out.matches("Assistant:").count(), 1);
    assert!(out.contains("Assistant: Hi there!\n"));
    assert!(out.ends_with("Goodbye!\n"));
}

#[tokio::test]
async fn exit_keywords_are_case_insensitive() {
    for word in ["Quit", "QUIT", "q", "Exit"] {
        let client = ScriptedClient::new(vec![]);
        let mut repl = repl_with(client.clone(), ReplOptions::default());

        let (result, out) = run_session(&mut repl, &format!("{word}\nnever read\n")).await;

        assert_eq!(result.unwrap(), SessionEnd::Quit, "{word}");
        assert!(client.calls().is_empty(), "{word} reached the provider");
        assert!(out.contains("Goodbye!"));
    }
}

#[tokio::test]
async fn closed_input_asks_fallback_once() {
    let client = ScriptedClient::new(vec![Ok("LangGraph builds agent graphs.")]);
    let mut repl = repl_with(client.clone(), ReplOptions::default());

    let (result, out) = run_session(&mut repl, "").await;

    assert_eq!(result.unwrap(), SessionEnd::InputClosed);
    assert_eq!(client.calls(), vec![vec![ChatMessage::user("What do you know about LangGraph?")]]);
    assert!(out.contains("User: What do you know about LangGraph?\n"));
    assert!(out.ends_with("Assistant: LangGraph builds agent graphs.\n"));
    assert!(!out.contains("Goodbye!"));
}

#[tokio::test]
async fn unreadable_input_is_not_retried() {
    let reads = Arc::new(AtomicUsize::new(0));
    let input = BufReader::new(BrokenInput { reads: reads.clone() });
    let client = ScriptedClient::new(vec![Ok("fallback answer")]);
    let mut repl = repl_with(client.clone(), ReplOptions::default());

    let mut out = Vec::new();
    let end = repl.run(input, &mut out).await.unwrap();

    assert_eq!(end, SessionEnd::InputClosed);
    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn input_ending_mid_session_falls_back() {
    let client = ScriptedClient::new(vec![Ok("one"), Ok("two")]);
    let mut repl = repl_with(client.clone(), ReplOptions::default());

    let (result, out) = run_session(&mut repl, "first question\n").await;

    assert_eq!(result.unwrap(), SessionEnd::InputClosed);
    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1], vec![ChatMessage::user("What do you know about LangGraph?")]);
    assert_eq!(out.matches("Assistant:").count(), 2);
}

#[tokio::test]
async fn provider_failure_is_reported_and_loop_continues() {
    let client = ScriptedClient::new(vec![Err("rate limited"), Ok("recovered")]);
    let mut repl = repl_with(client.clone(), ReplOptions::default());

    let (result, out) = run_session(&mut repl, "one\ntwo\nq\n").await;

    assert_eq!(result.unwrap(), SessionEnd::Quit);
    assert_eq!(client.calls().len(), 2);
    assert!(out.contains("Error: "));
    assert!(out.contains("rate limited"));
    assert!(out.contains("Assistant: recovered\n"));

    // The failed turn leaves nothing behind.
    let roles: Vec<Role> = repl.transcript().iter().map(|m| m.role()).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);
    assert_eq!(repl.transcript().messages()[0].content(), "two");
}

#[tokio::test]
async fn failed_fallback_turn_is_an_error() {
    let client = ScriptedClient::new(vec![Err("unauthorized")]);
    let mut repl = repl_with(client.clone(), ReplOptions::default());

    let (result, _) = run_session(&mut repl, "").await;

    let err = result.unwrap_err();
    assert!(matches!(err, ChatError::Graph(GraphError::Node { .. })));
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn blank_lines_skip_the_provider() {
    let client = ScriptedClient::new(vec![Ok("only reply")]);
    let mut repl = repl_with(client.clone(), ReplOptions::default());

    let (result, _) = run_session(&mut repl, "\n   \nreal\nexit\n").await;

    assert_eq!(result.unwrap(), SessionEnd::Quit);
    assert_eq!(client.calls(), vec![vec![ChatMessage::user("real")]]);
}

#[tokio::test]
async fn each_turn_adds_one_user_and_one_assistant_message() {
    let client = Arc::new(EchoChatClient::new());
    let mut repl = repl_with(client, ReplOptions::default());

    let (result, out) = run_session(&mut repl, "a\nb\nc\nquit\n").await;

    assert_eq!(result.unwrap(), SessionEnd::Quit);
    assert!(out.contains("Assistant: [echo] b\n"));
    let transcript: Vec<(Role, &str)> = repl
        .transcript()
        .iter()
        .map(|m| (m.role(), m.content()))
        .collect();
    assert_eq!(transcript, vec![
        (Role::User, "a"),
        (Role::Assistant, "[echo] a"),
        (Role::User, "b"),
        (Role::Assistant, "[echo] b"),
        (Role::User, "c"),
        (Role::Assistant, "[echo] c"),
    ]);
}

#[tokio::test]
async fn turns_are_independent_by_default() {
    let client = ScriptedClient::new(vec![Ok("r1"), Ok("r2")]);
    let mut repl = repl_with(client.clone(), ReplOptions::default());

    run_session(&mut repl, "first\nsecond\nq\n").await.0.unwrap();

    assert_eq!(client.calls()[1], vec![ChatMessage::user("second")]);
}

#[tokio::test]
async fn keep_history_sends_the_transcript() {
    let client = ScriptedClient::new(vec![Ok("r1"), Ok("r2")]);
    let options = ReplOptions { keep_history: true, ..ReplOptions::default() };
    let mut repl = repl_with(client.clone(), options);

    run_session(&mut repl, "first\nsecond\nq\n").await.0.unwrap();

    let calls = client.calls();
    assert_eq!(calls[1], vec![
        ChatMessage::user("first"),
        ChatMessage::assistant("r1"),
        ChatMessage::user("second"),
    ]);
    assert_eq!(calls[1].last().map(|m| m.role()), Some(Role::User));
}
