//! Scripted in-process SMTP server for dispatcher tests

use std::{
    io,
    sync::{Arc, Mutex},
};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};

/// How the test server answers
#[derive(Clone, Debug, Default)]
pub struct SmtpScript {
    /// Extensions advertised in the EHLO reply
    pub capabilities: Vec<String>,

    /// Answer `AUTH` with 535
    pub reject_auth: bool,

    /// Answer `RCPT TO` with 550
    pub reject_recipients: bool,
}

#[derive(Debug, Default)]
struct Transcript {
    sessions: usize,
    commands: Vec<String>,
    messages: Vec<String>,
}

/// An SMTP server on an ephemeral localhost port that records every session
#[derive(Debug)]
pub struct TestSmtpServer {
    port: u16,
    transcript: Arc<Mutex<Transcript>>,
    task: JoinHandle<()>,
}

impl TestSmtpServer {
    /// Binds the listener and starts accepting connections
    pub async fn start(script: SmtpScript) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let transcript = Arc::new(Mutex::new(Transcript::default()));

        let task = tokio::spawn({
            let transcript = transcript.clone();

            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    transcript.lock().unwrap().sessions += 1;

                    // a broken session is visible in the transcript
                    let _ = session(stream, &script, &transcript).await;
                }
            }
        });

        Ok(Self {
            port,
            transcript,
            task,
        })
    }

    /// The port the server listens on
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Every command received, in order, across all sessions
    pub fn commands(&self) -> Vec<String> {
        self.transcript.lock().unwrap().commands.clone()
    }

    /// The raw content of every accepted message
    pub fn messages(&self) -> Vec<String> {
        self.transcript.lock().unwrap().messages.clone()
    }

    /// The number of connections accepted
    pub fn sessions(&self) -> usize {
        self.transcript.lock().unwrap().sessions
    }
}

impl Drop for TestSmtpServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn session(
    stream: TcpStream,
    script: &SmtpScript,
    transcript: &Mutex<Transcript>,
) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    writer.write_all(b"220 localhost ESMTP test\r\n").await?;

    while let Some(line) = lines.next_line().await? {
        transcript.lock().unwrap().commands.push(line.clone());

        let verb = line
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();

        let reply = match verb.as_str() {
            "EHLO" | "HELO" => ehlo_reply(&script.capabilities),
            "AUTH" if script.reject_auth => "535 5.7.8 Authentication credentials invalid\r\n".into(),
            "AUTH" => "235 2.7.0 Authentication successful\r\n".into(),
            "STARTTLS" => "454 4.7.0 TLS not available\r\n".into(),
            "RCPT" if script.reject_recipients => "550 5.1.1 No such user\r\n".into(),
            "MAIL" | "RCPT" | "RSET" | "NOOP" => "250 2.0.0 OK\r\n".into(),
            "DATA" => {
                writer.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n").await?;

                let mut message = Vec::new();
                while let Some(line) = lines.next_line().await? {
                    if line == "." {
                        break;
                    }
                    message.push(line);
                }
                transcript.lock().unwrap().messages.push(message.join("\r\n"));

                "250 2.0.0 Queued\r\n".into()
            }
            "QUIT" => {
                writer.write_all(b"221 2.0.0 Bye\r\n").await?;
                break;
            }
            _ => "502 5.5.2 Command not recognized\r\n".to_string(),
        };

        writer.write_all(reply.as_bytes()).await?;
    }

    Ok(())
}

fn ehlo_reply(capabilities: &[String]) -> String {
    let lines: Vec<&str> = std::iter::once("localhost")
        .chain(capabilities.iter().map(String::as_str))
        .collect();

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let separator = if i + 1 == lines.len() { ' ' } else { '-' };
            format!("250{separator}{line}\r\n")
        })
        .collect()
}
