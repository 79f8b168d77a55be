//! Setup typed in by an operator, one field per line.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::{ContactFile, InterviewSetup, SetupDefaults, SetupError, SetupFile};

struct Console<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<R, W> Console<'_, R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn say(&mut self, text: &str) -> Result<(), SetupError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }

    async fn ask(&mut self, section: &str, field: &str) -> Result<String, SetupError> {
        self.say(&format!("{}: ", field)).await?;
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Err(SetupError::InputClosed(format!("{} {}", section, field.to_lowercase())));
        }
        Ok(line.trim().to_string())
    }

    async fn contact(&mut self, section: &str) -> Result<ContactFile, SetupError> {
        self.say(&format!("\n{} information:\n", section)).await?;
        Ok(ContactFile {
            name: self.ask(section, "Name").await?,
            title: None,
            email: self.ask(section, "Email").await?,
            phone: self.ask(section, "Phone").await?,
            organization: None,
        })
    }
}

/// Ask for HR, interviewer and candidate contacts plus the position.
///
/// The interviewer belongs to the HR contact's company. A blank interview
/// type falls back to `defaults`. The result is validated.
pub async fn read_setup<R, W>(
    input: &mut R,
    output: &mut W,
    defaults: &SetupDefaults,
) -> Result<InterviewSetup, SetupError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut console = Console { input, output };
    console
        .say("Please enter the contact details for interview coordination:\n")
        .await?;

    let hr = console.contact("HR contact").await?;
    let company = console.ask("HR contact", "Company").await?;
    let interviewer = console.contact("Interviewer").await?;
    let candidate = console.contact("Candidate").await?;

    console.say("\nPosition information:\n").await?;
    let position = console.ask("Position", "Position title").await?;
    let interview_type = console
        .ask("Position", &format!("Interview type [{}]", defaults.interview_type))
        .await?;

    InterviewSetup::from_setup_file(
        SetupFile {
            company,
            position,
            interview_type: Some(interview_type).filter(|t| !t.is_empty()),
            duration_minutes: None,
            hr,
            interviewer,
            candidate,
        },
        defaults,
    )
}
