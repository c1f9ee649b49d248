//! Templated interview transcript generator
//!
//! Produces synthetic interviews in the role-prefixed format the extractor
//! reads. Output is fully determined by the seed.

use chrono::{Duration, NaiveDate};
use rand::distributions::WeightedError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_INTERVIEW_COUNT: usize = 22;
pub const DEFAULT_SEED: u64 = 42;
pub const METADATA_FILE: &str = "interview_metadata.json";

const DIVIDER: &str = "------------------------------------------------------------";

const TOOLS: &[&str] = &[
    "Notion", "Todoist", "Trello", "Asana", "ClickUp", "Microsoft To Do", "Google Keep", "Evernote",
];

const CURRENT_TOOLS: &[&str] = &["None", "Pen and paper", "Google Keep", "Basic notes app"];

const METHODS: &[&str] = &["Video call", "In-person", "Phone"];

const NOTES: &[&str] = &[
    "Spoke with a lot of energy about the topic. Obvious frustration with current tools.",
    "Got emotional when talking about guilt. Worth following up.",
    "Kept coming back to simplicity. Said \"less is more\" several times.",
    "Very detailed answers. Has clearly thought about this before.",
    "Quiet at the start, opened up after ten minutes. Good rapport.",
];

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("persona weights: {0}")]
    Weights(#[from] WeightedError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Persona {
    #[serde(rename = "The Overwhelmed Optimizer")]
    OverwhelmedOptimizer,
    #[serde(rename = "The Serial Abandoner")]
    SerialAbandoner,
    #[serde(rename = "The Analog Holdout")]
    AnalogHoldout,
}

impl Persona {
    pub const ALL: [Persona; 3] = [
        Persona::OverwhelmedOptimizer,
        Persona::SerialAbandoner,
        Persona::AnalogHoldout,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Persona::OverwhelmedOptimizer => "The Overwhelmed Optimizer",
            Persona::SerialAbandoner => "The Serial Abandoner",
            Persona::AnalogHoldout => "The Analog Holdout",
        }
    }

    /// Share of interviewees
    pub fn frequency(self) -> f64 {
        match self {
            Persona::OverwhelmedOptimizer => 0.40,
            Persona::SerialAbandoner => 0.35,
            Persona::AnalogHoldout => 0.25,
        }
    }

    pub fn age_range(self) -> (u32, u32) {
        match self {
            Persona::OverwhelmedOptimizer => (21, 25),
            Persona::SerialAbandoner => (18, 22),
            Persona::AnalogHoldout => (23, 28),
        }
    }

    pub fn occupation(self) -> &'static str {
        match self {
            Persona::OverwhelmedOptimizer => "Engineering student / Young professional",
            Persona::SerialAbandoner => "College student",
            Persona::AnalogHoldout => "Creative professional / Graduate student",
        }
    }

    /// One-line tool behavior
    pub fn behavior(self) -> &'static str {
        match self {
            Persona::OverwhelmedOptimizer => "Installs every planner going, drops each within two weeks",
            Persona::SerialAbandoner => "Starts a new tool with energy, stops opening it within days",
            Persona::AnalogHoldout => "Keeps a paper notebook, tried digital and went back",
        }
    }

    pub fn primary_pain(self) -> &'static str {
        match self {
            Persona::OverwhelmedOptimizer => "Organizing the system takes longer than doing the work",
            Persona::SerialAbandoner => "A growing list of unfinished tasks turns into guilt",
            Persona::AnalogHoldout => "Digital tools feel cold and rigid next to paper",
        }
    }
}

/// Pain points an interview can dig into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PainPoint {
    Setup,
    Features,
    Guilt,
    Contexts,
    Priorities,
}

const PAIN_POINTS: [PainPoint; 5] = [
    PainPoint::Setup,
    PainPoint::Features,
    PainPoint::Guilt,
    PainPoint::Contexts,
    PainPoint::Priorities,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewMetadata {
    pub interview_id: String,
    pub date: NaiveDate,
    pub duration_minutes: u32,
    pub participant_id: String,
    pub age: u32,
    pub occupation: String,
    pub persona: Persona,
    pub tools_abandoned: u32,
    pub current_tool: String,
    pub interview_method: String,
}

#[derive(Debug, Clone)]
pub struct GeneratedInterview {
    /// `interview_NN`, also the transcript id the corpus loader assigns
    pub file_stem: String,
    pub transcript: String,
    pub metadata: InterviewMetadata,
}

pub struct InterviewGenerator {
    count: usize,
    rng: StdRng,
}

impl InterviewGenerator {
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            count,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick<'a>(&mut self, options: &'a [&'a str]) -> &'a str {
        options.choose(&mut self.rng).copied().unwrap_or_default()
    }

    /// Generate interview number `n` (1-based)
    pub fn generate(&mut self, n: usize) -> Result<GeneratedInterview, GeneratorError> {
        let persona = *Persona::ALL.choose_weighted(&mut self.rng, |p| p.frequency())?;
        let (lo, hi) = persona.age_range();
        let age = self.rng.gen_range(lo..=hi);

        let start = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap_or_default();
        let metadata = InterviewMetadata {
            interview_id: format!("INT_{:03}", n),
            date: start + Duration::days(self.rng.gen_range(0..=45)),
            duration_minutes: self.rng.gen_range(30..=45),
            participant_id: format!("P{:03}", n),
            age,
            occupation: persona.occupation().to_string(),
            persona,
            tools_abandoned: self.rng.gen_range(2..=7),
            current_tool: self.pick(CURRENT_TOOLS).to_string(),
            interview_method: self.pick(METHODS).to_string(),
        };

        let mut transcript = format!(
            "INTERVIEW TRANSCRIPT\n\
Interview ID: {}\n\
Date: {}\n\
Duration: {} minutes\n\
Participant: {} (Anonymous)\n\
Method: {}\n\
\n{}\n\n",
            metadata.interview_id,
            metadata.date.format("%Y-%m-%d"),
            metadata.duration_minutes,
            metadata.participant_id,
            metadata.interview_method,
            DIVIDER,
        );

        transcript.push_str(&opening(&metadata));
        transcript.push_str(&self.tool_history(persona));
        transcript.push_str(&self.pain_points());
        transcript.push_str(ideal_solution(persona));
        transcript.push_str(CLOSING);

        // the divider goes after the end marker so it never joins the last turn
        transcript.push_str(&format!(
            "\n\nEND OF INTERVIEW\n{}\nInterviewer Notes: {}\n",
            DIVIDER,
            self.pick(NOTES)
        ));

        Ok(GeneratedInterview {
            file_stem: format!("interview_{:02}", n),
            transcript,
            metadata,
        })
    }

    pub fn generate_all(&mut self) -> Result<Vec<GeneratedInterview>, GeneratorError> {
        (1..=self.count).map(|n| self.generate(n)).collect()
    }

    /// Write `interview_NN.txt` files and the metadata JSON into `dir`
    pub fn write_all<P: AsRef<Path>>(&mut self, dir: P) -> Result<Vec<PathBuf>, GeneratorError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let interviews = self.generate_all()?;
        let mut written = Vec::with_capacity(interviews.len() + 1);
        for interview in &interviews {
            let path = dir.join(format!("{}.txt", interview.file_stem));
            fs::write(&path, &interview.transcript)?;
            written.push(path);
        }

        let metadata: Vec<&InterviewMetadata> = interviews.iter().map(|i| &i.metadata).collect();
        let metadata_path = dir.join(METADATA_FILE);
        fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?)?;
        written.push(metadata_path);

        info!(interviews = interviews.len(), dir = %dir.display(), "generated transcripts");
        Ok(written)
    }

    fn tool_history(&mut self, persona: Persona) -> String {
        let mut tools: Vec<&str> = TOOLS.to_vec();
        tools.shuffle(&mut self.rng);
        let tried = self.rng.gen_range(3..=6);
        tools.truncate(tried);

        match persona {
            Persona::OverwhelmedOptimizer => format!(
                "Oh, loads of them. {} and probably a few I've forgotten. I'm always looking for the perfect system. \
I spend hours on YouTube tutorials and setting things up, but I never stick with one for more than a couple of weeks.

INTERVIEWER: What happens after those couple of weeks?

PARTICIPANT: I kind of run out of steam. I spend so much time organizing and reorganizing that the real work never happens. \
Then the unfinished tasks pile up and the whole thing feels overwhelming. So I decide the tool isn't right for me and I try another one. \
Honestly it's exhausting.
",
                tools.join(", ")
            ),
            Persona::SerialAbandoner => format!(
                "Yeah, I've used {}. I get really excited at the start, like this is finally the one. \
The first few days I add every task, color-code everything, set up reminders. \
Then life gets busy, I miss a few days, and when I come back there's a wall of overdue tasks in red. \
It makes me feel terrible, so I stop opening the app.

INTERVIEWER: So the notifications make you feel guilty?

PARTICIPANT: Exactly. It's like the app is judging me. Seeing all those incomplete tasks just tells me I'm failing. \
So I stop using it, and then I feel guilty about abandoning that one too.
",
                tools[..3].join(", ")
            ),
            Persona::AnalogHoldout => format!(
                "I've tried {}, but I always go back to pen and paper. Writing by hand just works better for my brain. \
Digital tools feel cold to me. I used Notion for a few weeks because everyone at work uses it, \
but I kept switching between the app and my notebook. Eventually I gave up on the digital stuff.

INTERVIEWER: What made you go back to paper?

PARTICIPANT: The apps just don't have that flexibility. In a notebook I can doodle, draw arrows, cross things out when I'm frustrated. \
I never have to worry about which template to use or how to structure anything. \
It's liberating compared to all those menus and buttons and settings.
",
                tools[..2].join(" and ")
            ),
        }
    }

    fn pain_points(&mut self) -> String {
        let k = self.rng.gen_range(3..=4);
        let chosen: Vec<PainPoint> = PAIN_POINTS
            .choose_multiple(&mut self.rng, k)
            .copied()
            .collect();

        let mut section = String::from(
            "\nINTERVIEWER: Let's dig into what didn't work. Can you walk me through a typical experience?\n\nPARTICIPANT: ",
        );
        // canonical order keeps the conversation flowing the same way every time
        for pain in PAIN_POINTS.iter().filter(|p| chosen.contains(p)) {
            section.push_str(pain_point_text(*pain));
        }
        section
    }
}

/// Read the metadata JSON written by [`InterviewGenerator::write_all`]
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<Vec<InterviewMetadata>, GeneratorError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn opening(metadata: &InterviewMetadata) -> String {
    format!(
        "INTERVIEWER: Thanks for joining me today! Can you start by telling me a bit about yourself?

PARTICIPANT: Sure! I'm {} years old and I'm a {}. I've been trying to get better at managing my tasks and projects.

INTERVIEWER: Great. Have you used any productivity tools before?

PARTICIPANT: ",
        metadata.age,
        metadata.occupation.to_lowercase()
    )
}

fn pain_point_text(pain: PainPoint) -> &'static str {
    match pain {
        PainPoint::Setup => {
            "Sure. I download the app, make an account, and then there's a blank screen staring at me. \
I usually end up watching a thirty minute tutorial just to understand the basics, then spend another couple of hours rebuilding what I saw. \
By the time the setup is done I'm mentally exhausted and haven't done anything productive.

INTERVIEWER: So getting started is draining on its own?

PARTICIPANT: Completely. And I'm never sure I set it up correctly. Am I using the right template? \
Should I configure tags or folders? There's no right answer so I keep second-guessing myself.

INTERVIEWER: What happens once everything is set up?

PARTICIPANT: "
        }
        PainPoint::Features => {
            "Then I start using it and discover all these features I never knew existed. \
Pop-ups about databases, integrations, automations, AI assistants, it's overwhelming. \
I feel like I should be using all of it, but I don't understand what half the buttons do. \
So I ignore everything and stick to a basic list.

INTERVIEWER: So most of the features go unused?

PARTICIPANT: Maybe five percent of what the tool can do. Which makes me wonder why I'm using something this complex at all. \
It's confusing.

INTERVIEWER: How does that make you feel?

PARTICIPANT: "
        }
        PainPoint::Guilt => {
            "Honestly, like a failure. I watch people on YouTube with these gorgeous workspaces tracking every part of their lives, \
and I can't keep a simple task list going for a week. \
It stops being about the tool and starts being about me not being disciplined enough.

INTERVIEWER: Does the tool itself add to that?

PARTICIPANT: Absolutely. Every time I open it there's the list of incomplete tasks with overdue badges. \
It's a picture of everything I didn't do, and the guilt gets worse every day I avoid it.

INTERVIEWER: Is that the same everywhere you use it?

PARTICIPANT: "
        }
        PainPoint::Contexts => {
            "Not really, because my work and personal life are so different. \
At work I think in projects, at home it's errands and random ideas. \
I tried to keep separate workspaces for each, but switching between them all day just added more friction.

INTERVIEWER: So the context matters a lot?

PARTICIPANT: It does. My brain works one way at work vs home, and the tool treats everything the same.

INTERVIEWER: And when you look at all of it together?

PARTICIPANT: "
        }
        PainPoint::Priorities => {
            "Then I don't know what to do first. I have fifty tasks and no idea which one matters. \
Everything looks equally urgent and equally important, so I can't decide where to start. \
I spend the morning re-sorting the list instead of doing anything on it.

INTERVIEWER: What would need to change for you to stick with a tool?

PARTICIPANT: "
        }
    }
}

fn ideal_solution(persona: Persona) -> &'static str {
    match persona {
        Persona::OverwhelmedOptimizer => {
            "I think I need something that starts really simple. Show me three things to do today and that's it. \
Don't give me a hundred options until I ask for them, and walk me through the first task instead of dropping me in an empty workspace.

INTERVIEWER: So reveal features gradually?

PARTICIPANT: Yes, exactly that. Start with just tasks, then introduce one new feature at a time once I'm actually using it.

INTERVIEWER: What about the guilt and overwhelm you mentioned?

PARTICIPANT: The tool should feel like a partner instead of a judge. Show me what I've accomplished, not only what's left. \
Maybe even force me to focus on three things instead of fifty. Sometimes limits are freeing."
        }
        Persona::SerialAbandoner => {
            "I need something that won't make me feel bad when I fall off the wagon. \
If I disappear for three days, don't punish me with scary red notifications, just welcome me back gently.

INTERVIEWER: So it's about tone?

PARTICIPANT: Tone, and realistic expectations. Don't let me add thirty tasks on day one. \
Stop me and suggest starting with three, because I will overdo it in the honeymoon phase and then crash.

INTERVIEWER: Anything else?

PARTICIPANT: Quick wins. I need to feel successful in the very first session. \
If I can add a task and check it off in five minutes and the app celebrates that, I'd be much more likely to come back tomorrow."
        }
        Persona::AnalogHoldout => {
            "Honestly I might never fully leave paper. But if a digital tool gave me the freedom of a notebook \
without forcing me into rigid structures, I could use it alongside my notebook for reminders and sharing.

INTERVIEWER: What would that flexibility look like?

PARTICIPANT: Less of 'you must use our system' and more 'use it however it makes sense to you'. \
Don't make me choose between ten template types. Give me a blank page and let me add structure later if I want.

INTERVIEWER: Would you ever switch completely?

PARTICIPANT: Only if it felt like paper. Right now these tools try to do everything, so nothing feels particularly good. \
I'd rather have a tool that does one thing perfectly."
        }
    }
}

const CLOSING: &str = "

INTERVIEWER: This has been really helpful. Is there anything else you'd like to add?

PARTICIPANT: Just please build something that doesn't make people feel stupid or inadequate. \
Productivity tools should empower people, not make them feel worse about themselves.

INTERVIEWER: That's a great note to end on. Thank you so much for your time!

PARTICIPANT: Thanks for listening!";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::SentenceExtractor;

    #[test]
    fn test_same_seed_same_output() {
        let a = InterviewGenerator::new(5, 7).generate_all().unwrap();
        let b = InterviewGenerator::new(5, 7).generate_all().unwrap();
        let texts_a: Vec<&str> = a.iter().map(|i| i.transcript.as_str()).collect();
        let texts_b: Vec<&str> = b.iter().map(|i| i.transcript.as_str()).collect();
        assert_eq!(texts_a, texts_b);
    }

    #[test]
    fn test_metadata_ranges() {
        let interviews = InterviewGenerator::new(DEFAULT_INTERVIEW_COUNT, DEFAULT_SEED)
            .generate_all()
            .unwrap();
        assert_eq!(interviews.len(), DEFAULT_INTERVIEW_COUNT);
        assert_eq!(interviews[0].file_stem, "interview_01");
        assert_eq!(interviews[0].metadata.interview_id, "INT_001");
        assert_eq!(interviews[21].metadata.participant_id, "P022");

        let first = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        for interview in &interviews {
            let m = &interview.metadata;
            let (lo, hi) = m.persona.age_range();
            assert!((lo..=hi).contains(&m.age));
            assert!((30..=45).contains(&m.duration_minutes));
            assert!((2..=7).contains(&m.tools_abandoned));
            assert!(m.date >= first && m.date <= first + Duration::days(45));
            assert_eq!(m.occupation, m.persona.occupation());
        }
    }

    #[test]
    fn test_transcripts_are_extractable() {
        let extractor = SentenceExtractor::default();
        for interview in InterviewGenerator::new(6, 1).generate_all().unwrap() {
            assert!(interview.transcript.contains("END OF INTERVIEW"));
            let candidates = extractor
                .extract(&interview.file_stem, &interview.transcript)
                .unwrap();
            assert!(candidates.len() > 10);
            // interviewer notes come after the end marker and are never content
            assert!(candidates.iter().all(|c| !c.text.contains("Interviewer Notes")));
        }
    }

    #[test]
    fn test_write_all() {
        let dir = tempfile::TempDir::new().unwrap();
        let written = InterviewGenerator::new(3, 3).write_all(dir.path()).unwrap();
        assert_eq!(written.len(), 4);
        assert!(dir.path().join("interview_03.txt").exists());

        let metadata: Vec<InterviewMetadata> = serde_json::from_str(
            &fs::read_to_string(dir.path().join(METADATA_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(metadata.len(), 3);
        assert_eq!(metadata[2].interview_id, "INT_003");
    }

    #[test]
    fn test_transcript_layout() {
        let interview = InterviewGenerator::new(1, 11).generate(1).unwrap();
        let text = &interview.transcript;
        assert!(text.starts_with("INTERVIEW TRANSCRIPT\nInterview ID: INT_001\nDate: "));
        assert!(text.contains("Participant: P001 (Anonymous)\n"));
        assert!(text.ends_with("\n"));

        let end = text.find("END OF INTERVIEW").unwrap();
        let notes = text.find("Interviewer Notes: ").unwrap();
        assert!(end < notes);
        assert!(text[end..notes].contains(DIVIDER));
    }

    #[test]
    fn test_read_metadata() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut generator = InterviewGenerator::new(2, 5);
        generator.write_all(dir.path()).unwrap();
        let metadata = read_metadata(dir.path().join(METADATA_FILE)).unwrap();
        let expected: Vec<InterviewMetadata> = InterviewGenerator::new(2, 5)
            .generate_all()
            .unwrap()
            .into_iter()
            .map(|i| i.metadata)
            .collect();
        assert_eq!(metadata, expected);
    }
}
