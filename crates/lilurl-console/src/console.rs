use crate::launcher::Launcher;
use lilurl_core::{AccessError, EntrySnapshot, LinkState, OwnerId, ShortCode};
use lilurl_generator::Generator;
use lilurl_registry::AccessController;
use lilurl_storage::EntryStore;
use std::fmt::Display;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

const MENU: &str = "\
1. Create a short URL
2. Open a short URL
3. Edit the access limit
4. Delete a short URL
5. List your short URLs
6. Exit";

const ASK_SHORT_URL: &str = "Enter the short URL:";
const ASK_OWNER: &str = "Enter your user UUID:";
const INVALID_LIMIT: &str = "The access limit must be a whole number of zero or more.";

enum Step {
    Continue,
    Quit,
}

/// Menu-driven session over any line reader and writer.
pub struct Console<S, G, R, W> {
    controller: Arc<AccessController<S, G>>,
    launcher: Arc<dyn Launcher>,
    input: R,
    output: W,
}

impl<S, G, R, W> Console<S, G, R, W>
where
    S: EntryStore,
    G: Generator,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        controller: Arc<AccessController<S, G>>,
        launcher: Arc<dyn Launcher>,
        input: R,
        output: W,
    ) -> Self {
        Self {
            controller,
            launcher,
            input,
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs the menu until the user exits or input ends.
    pub async fn run(&mut self) -> io::Result<()> {
        self.say("Welcome to lilurl!").await?;

        loop {
            self.say(MENU).await?;
            let Some(choice) = self.read_line().await? else {
                break;
            };

            let step = match choice.as_str() {
                "1" => self.create().await?,
                "2" => self.open().await?,
                "3" => self.edit_limit().await?,
                "4" => self.delete().await?,
                "5" => self.list().await?,
                "6" => {
                    self.say("Goodbye!").await?;
                    Step::Quit
                }
                other => {
                    debug!(choice = %other, "unknown menu choice");
                    self.say("Invalid choice. Please try again.").await?;
                    Step::Continue
                }
            };

            if let Step::Quit = step {
                break;
            }
        }

        Ok(())
    }

    async fn create(&mut self) -> io::Result<Step> {
        let Some(url) = self.ask("Enter the original URL:").await? else {
            return Ok(Step::Continue);
        };
        if url.is_empty() {
            self.say("The URL cannot be empty.").await?;
            return Ok(Step::Continue);
        }

        let Some(owner) = self
            .ask_parsed(
                "Enter your user UUID (or press Enter to generate a new one):",
                |input| {
                    if input.is_empty() {
                        Ok(None)
                    } else {
                        OwnerId::parse(input).map(Some)
                    }
                },
            )
            .await?
        else {
            return Ok(Step::Continue);
        };

        let created = self.controller.create(&url, owner.as_ref());

        if created.owner_generated {
            self.say(&format!("Generated new user UUID: {}", created.owner))
                .await?;
        }
        if created.replaced {
            self.say("This replaces your earlier short URL for the same address; its access limit was reset.")
                .await?;
        }
        let short_url = self.controller.short_url(&created.code);
        self.say(&format!("Your short URL: {}", short_url)).await?;

        Ok(Step::Continue)
    }

    async fn open(&mut self) -> io::Result<Step> {
        let Some((code, owner)) = self.ask_link().await? else {
            return Ok(Step::Continue);
        };

        match self.controller.access(&code, &owner) {
            Ok(url) => {
                self.say(&format!("Opening {}", url)).await?;
                let launched = self.launcher.open(&url).await;
                if let Err(e) = launched {
                    warn!(url = %url, error = %e, "failed to open browser");
                    self.say(&format!("Could not open a browser: {}", e)).await?;
                }
            }
            Err(e) => self.refuse(&e).await?,
        }

        Ok(Step::Continue)
    }

    async fn edit_limit(&mut self) -> io::Result<Step> {
        let Some((code, owner)) = self.ask_link().await? else {
            return Ok(Step::Continue);
        };
        let Some(limit) = self
            .ask_parsed("Enter the new access limit:", |input| {
                input.parse::<u32>().map_err(|_| INVALID_LIMIT)
            })
            .await?
        else {
            return Ok(Step::Continue);
        };

        match self.controller.edit_access_limit(&code, &owner, limit) {
            Ok(()) => self.say("The access limit was updated.").await?,
            Err(e) => self.refuse(&e).await?,
        }

        Ok(Step::Continue)
    }

    async fn delete(&mut self) -> io::Result<Step> {
        let Some((code, owner)) = self.ask_link().await? else {
            return Ok(Step::Continue);
        };

        match self.controller.delete(&code, &owner) {
            Ok(()) => self.say("The link was deleted.").await?,
            Err(e) => self.refuse(&e).await?,
        }

        Ok(Step::Continue)
    }

    async fn list(&mut self) -> io::Result<Step> {
        let Some(owner) = self.ask_parsed(ASK_OWNER, OwnerId::parse).await? else {
            return Ok(Step::Continue);
        };

        let links = self.controller.links(&owner);
        if links.is_empty() {
            self.say("You have no short URLs.").await?;
            return Ok(Step::Continue);
        }

        for link in &links {
            let line = self.describe(link);
            self.say(&line).await?;
        }

        Ok(Step::Continue)
    }

    fn describe(&self, link: &EntrySnapshot) -> String {
        let expires = link
            .expires_at
            .map_or_else(|| "never".to_string(), |at| at.to_string());
        let state = match link.state {
            LinkState::Active => "active",
            LinkState::Expired => "expired",
            LinkState::Exhausted => "limit reached",
        };
        format!(
            "{} -> {} (remaining: {}, expires: {}, {})",
            self.controller.short_url(&link.code),
            link.original_url,
            link.remaining_accesses,
            expires,
            state
        )
    }

    async fn refuse(&mut self, error: &AccessError) -> io::Result<()> {
        let message = match error {
            AccessError::NotFound(_) => "This link does not exist.",
            AccessError::Expired(_) => "This link is no longer active.",
            AccessError::Unauthorized(_) => {
                "You do not have permission to use or change this link."
            }
            AccessError::LimitExhausted(_) => "The access limit for this link has been reached.",
        };
        self.say(message).await
    }

    /// Asks for a short URL and the caller's UUID.
    async fn ask_link(&mut self) -> io::Result<Option<(ShortCode, OwnerId)>> {
        let controller = Arc::clone(&self.controller);
        let Some(code) = self
            .ask_parsed(ASK_SHORT_URL, |input| controller.parse_short_url(input))
            .await?
        else {
            return Ok(None);
        };
        let Some(owner) = self.ask_parsed(ASK_OWNER, OwnerId::parse).await? else {
            return Ok(None);
        };
        Ok(Some((code, owner)))
    }

    /// Asks `question` and parses the answer.
    ///
    /// `None` means input ran out or the answer was rejected; a rejection
    /// has already been reported to the user.
    async fn ask_parsed<T, E: Display>(
        &mut self,
        question: &str,
        parse: impl FnOnce(&str) -> Result<T, E>,
    ) -> io::Result<Option<T>> {
        let Some(answer) = self.ask(question).await? else {
            return Ok(None);
        };
        match parse(&answer) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                self.say(&e.to_string()).await?;
                Ok(None)
            }
        }
    }

    async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        self.say(question).await?;
        self.read_line().await
    }

    async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    async fn say(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lilurl_core::RegistrySettings;
    use lilurl_generator::HashGenerator;
    use lilurl_storage::{InMemoryEntryStore, UserRegistry};
    use std::sync::Mutex;

    const ALICE: &str = "0b6f4e1c-3a8e-4f7a-9a0d-2c3e4f5a6b7c";
    const BOB: &str = "9d2c1b0a-8f7e-4d6c-b5a4-3f2e1d0c9b8a";
    const URL: &str = "https://example.com";

    #[derive(Default)]
    struct RecordingLauncher {
        opened: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Launcher for RecordingLauncher {
        async fn open(&self, url: &str) -> io::Result<()> {
            self.opened.lock().unwrap().push(url.to_string());
            if self.fail {
                Err(io::Error::other("no display"))
            } else {
                Ok(())
            }
        }
    }

    type TestController = AccessController<InMemoryEntryStore, HashGenerator>;

    fn controller(limit: u32) -> Arc<TestController> {
        let settings = RegistrySettings::builder()
            .base_url("http://lil.url/")
            .default_access_limit(limit)
            .build();
        Arc::new(
            AccessController::new(
                Arc::new(InMemoryEntryStore::new()),
                Arc::new(UserRegistry::new()),
                HashGenerator::new(),
                settings,
            )
            .unwrap(),
        )
    }

    fn short_url(url: &str, owner: &str) -> String {
        let code = HashGenerator::new().generate(url, &OwnerId::new_unchecked(owner));
        format!("http://lil.url/{}", code)
    }

    async fn run_script(
        controller: Arc<TestController>,
        launcher: Arc<RecordingLauncher>,
        script: &str,
    ) -> String {
        let mut console = Console::new(controller, launcher, script.as_bytes(), Vec::new());
        console.run().await.unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }

    #[tokio::test]
    async fn create_open_delete_session() {
        let controller = controller(10);
        let launcher = Arc::new(RecordingLauncher::default());
        let short = short_url(URL, ALICE);

        let script = format!(
            "1\n{URL}\n{ALICE}\n2\n{short}\n{ALICE}\n4\n{short}\n{ALICE}\n2\n{short}\n{ALICE}\n6\n"
        );
        let output = run_script(Arc::clone(&controller), Arc::clone(&launcher), &script).await;

        assert!(output.starts_with("Welcome to lilurl!"));
        assert!(output.contains(&format!("Your short URL: {}", short)));
        assert!(output.contains("Opening https://example.com"));
        assert!(output.contains("The link was deleted."));
        assert!(output.contains("This link does not exist."));
        assert!(output.trim_end().ends_with("Goodbye!"));
        assert_eq!(*launcher.opened.lock().unwrap(), vec![URL.to_string()]);
        assert!(controller.store().is_empty());
    }

    #[tokio::test]
    async fn blank_owner_gets_generated_uuid() {
        let controller = controller(10);
        let launcher = Arc::new(RecordingLauncher::default());

        let output = run_script(
            Arc::clone(&controller),
            launcher,
            &format!("1\n{URL}\n\n6\n"),
        )
        .await;

        assert!(output.contains("Generated new user UUID: "));
        assert_eq!(controller.users().len(), 1);
        assert_eq!(controller.store().len(), 1);
    }

    #[tokio::test]
    async fn bare_code_is_accepted() {
        let controller = controller(10);
        let launcher = Arc::new(RecordingLauncher::default());
        let created = controller.create(URL, Some(&OwnerId::new_unchecked(ALICE)));

        let output = run_script(
            controller,
            Arc::clone(&launcher),
            &format!("2\n{}\n{ALICE}\n", created.code),
        )
        .await;

        assert!(output.contains("Opening https://example.com"));
        assert_eq!(launcher.opened.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn other_owner_is_refused() {
        let controller = controller(10);
        let launcher = Arc::new(RecordingLauncher::default());
        let short = short_url(URL, ALICE);

        let output = run_script(
            Arc::clone(&controller),
            Arc::clone(&launcher),
            &format!("1\n{URL}\n{ALICE}\n2\n{short}\n{BOB}\n4\n{short}\n{BOB}\n6\n"),
        )
        .await;

        assert_eq!(
            output
                .matches("You do not have permission to use or change this link.")
                .count(),
            2
        );
        assert!(launcher.opened.lock().unwrap().is_empty());
        assert_eq!(controller.store().len(), 1);
    }

    #[tokio::test]
    async fn limit_can_be_raised_after_exhaustion() {
        let controller = controller(1);
        let launcher = Arc::new(RecordingLauncher::default());
        let short = short_url(URL, ALICE);

        let script = format!(
            "1\n{URL}\n{ALICE}\n\
             2\n{short}\n{ALICE}\n\
             2\n{short}\n{ALICE}\n\
             3\n{short}\n{ALICE}\n2\n\
             2\n{short}\n{ALICE}\n6\n"
        );
        let output = run_script(controller, Arc::clone(&launcher), &script).await;

        assert!(output.contains("The access limit for this link has been reached."));
        assert!(output.contains("The access limit was updated."));
        assert_eq!(launcher.opened.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn bad_input_returns_to_menu() {
        let controller = controller(10);
        let launcher = Arc::new(RecordingLauncher::default());
        let short = short_url(URL, ALICE);

        let script = format!(
            "7\n\
             1\n\n\
             1\n{URL}\nnot-a-uuid\n\
             1\n{URL}\n{ALICE}\n\
             3\n{short}\n{ALICE}\n-4\n\
             2\nhttps://elsewhere.example/abc\n\
             6\n"
        );
        let output = run_script(Arc::clone(&controller), launcher, &script).await;

        assert!(output.contains("Invalid choice. Please try again."));
        assert!(output.contains("The URL cannot be empty."));
        assert!(output.contains("invalid owner id"));
        assert!(output.contains("The access limit must be a whole number of zero or more."));
        assert!(output.contains("invalid short code"));
        assert!(output.trim_end().ends_with("Goodbye!"));
        assert_eq!(controller.store().len(), 1);
    }

    #[tokio::test]
    async fn list_shows_owned_links() {
        let controller = controller(4);
        let launcher = Arc::new(RecordingLauncher::default());
        let alice = OwnerId::new_unchecked(ALICE);
        controller.create("https://a.example", Some(&alice));
        controller.create("https://b.example", Some(&alice));

        let output = run_script(
            Arc::clone(&controller),
            launcher,
            &format!("5\n{ALICE}\n5\n{BOB}\n6\n"),
        )
        .await;

        assert!(output.contains(&format!(
            "{} -> https://a.example (remaining: 4",
            short_url("https://a.example", ALICE)
        )));
        assert!(output.contains("-> https://b.example"));
        assert!(output.contains("active"));
        assert!(output.contains("You have no short URLs."));
    }

    #[tokio::test]
    async fn launcher_failure_is_reported() {
        let controller = controller(10);
        let launcher = Arc::new(RecordingLauncher {
            fail: true,
            ..Default::default()
        });
        let short = short_url(URL, ALICE);

        let output = run_script(
            controller,
            launcher,
            &format!("1\n{URL}\n{ALICE}\n2\n{short}\n{ALICE}\n6\n"),
        )
        .await;

        assert!(output.contains("Opening https://example.com"));
        assert!(output.contains("Could not open a browser: no display"));
    }

    #[tokio::test]
    async fn end_of_input_ends_session() {
        let controller = controller(10);
        let launcher = Arc::new(RecordingLauncher::default());

        let output = run_script(Arc::clone(&controller), launcher, &format!("1\n{URL}\n")).await;

        assert!(!output.contains("Goodbye!"));
        assert!(controller.store().is_empty());
    }
}
