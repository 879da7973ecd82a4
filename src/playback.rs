use reqwest::blocking::Client;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::PlaybackError;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("riffle/", env!("CARGO_PKG_VERSION"));
/// Bundled tracks carry placeholder urls with no audio behind them
const OFFLINE_SCHEME: &str = "offline://";

/// Whether a preview url points at audio worth downloading
pub fn is_streamable(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && !url.starts_with(OFFLINE_SCHEME)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Play(String),
    Stop,
}

/// Where downloaded previews get decoded and played
pub trait AudioOutput {
    fn play(&mut self, bytes: Vec<u8>) -> Result<(), PlaybackError>;
    fn stop(&mut self);
}

#[cfg(feature = "audio")]
mod device {
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use std::io::Cursor;

    use super::AudioOutput;
    use crate::error::PlaybackError;

    /// Default output device. The stream must stay alive for the handle to work.
    pub struct RodioOutput {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sink: Option<Sink>,
    }

    impl RodioOutput {
        pub fn open() -> Result<Self, PlaybackError> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| PlaybackError::Device(e.to_string()))?;
            Ok(Self {
                _stream: stream,
                handle,
                sink: None,
            })
        }
    }

    impl AudioOutput for RodioOutput {
        fn play(&mut self, bytes: Vec<u8>) -> Result<(), PlaybackError> {
            let source = Decoder::new(Cursor::new(bytes))
                .map_err(|e| PlaybackError::Decode(e.to_string()))?;
            let sink = Sink::try_new(&self.handle)
                .map_err(|e| PlaybackError::Device(e.to_string()))?;
            sink.append(source);
            if let Some(previous) = self.sink.replace(sink) {
                previous.stop();
            }
            Ok(())
        }

        fn stop(&mut self) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
        }
    }
}

#[cfg(feature = "audio")]
fn open_output() -> Result<device::RodioOutput, PlaybackError> {
    device::RodioOutput::open()
}

#[cfg(not(feature = "audio"))]
fn open_output() -> Result<NoOutput, PlaybackError> {
    Err(PlaybackError::Device("built without the audio feature".to_string()))
}

#[cfg(not(feature = "audio"))]
struct NoOutput;

#[cfg(not(feature = "audio"))]
impl AudioOutput for NoOutput {
    fn play(&mut self, _bytes: Vec<u8>) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn stop(&mut self) {}
}

fn download(client: &Client, url: &str) -> Result<Vec<u8>, PlaybackError> {
    let response = client
        .get(url)
        .send()
        .map_err(|e| PlaybackError::Download(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(PlaybackError::Download(format!("HTTP {}", status.as_u16())));
    }
    let bytes = response
        .bytes()
        .map_err(|e| PlaybackError::Download(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Run commands until every sender is gone. A command that arrives while a preview is
/// downloading wins over that preview.
fn serve<O, F>(rx: &Receiver<Command>, output: &mut O, mut fetch: F)
where
    O: AudioOutput,
    F: FnMut(&str) -> Result<Vec<u8>, PlaybackError>,
{
    let mut next = rx.recv().ok();
    while let Some(command) = next.take() {
        match command {
            Command::Stop => output.stop(),
            Command::Play(url) => {
                output.stop();
                match fetch(&url) {
                    Ok(bytes) => {
                        if let Ok(newer) = rx.try_recv() {
                            debug!(url = %url, "preview superseded during download");
                            next = Some(newer);
                            continue;
                        }
                        if let Err(e) = output.play(bytes) {
                            warn!(url = %url, error = %e, "could not play preview");
                        }
                    }
                    Err(e) => warn!(url = %url, error = %e, "preview unavailable"),
                }
            }
        }
        next = rx.recv().ok();
    }
}

/// Plays previews on a worker thread that owns the audio device. Dropping the player
/// stops playback and ends the thread.
#[derive(Debug)]
pub struct PreviewPlayer {
    tx: Sender<Command>,
}

impl PreviewPlayer {
    /// Open the default output device; fails when there is none
    pub fn spawn() -> Result<Self, PlaybackError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| PlaybackError::Download(e.to_string()))?;
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        // the output stream is not Send, so it is opened on the thread that uses it
        std::thread::spawn(move || {
            let mut output = match open_output() {
                Ok(output) => {
                    let _ = ready_tx.send(Ok(()));
                    output
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            serve(&rx, &mut output, |url| download(&client, url));
        });

        ready_rx
            .recv()
            .map_err(|_| PlaybackError::Device("audio thread exited".to_string()))??;
        info!("preview playback ready");
        Ok(Self { tx })
    }

    /// Start `url`, replacing whatever plays. Urls without audio only stop playback.
    pub fn play(&self, url: &str) {
        if !is_streamable(url) {
            debug!(url, "no audio behind preview url");
            self.stop();
            return;
        }
        let _ = self.tx.send(Command::Play(url.to_string()));
    }

    pub fn stop(&self) {
        // a dead worker has nothing left to stop
        let _ = self.tx.send(Command::Stop);
    }
}
