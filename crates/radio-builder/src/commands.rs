use anyhow::{bail, Context, Result};
use radio_project::config::Config;
use radio_project::metadata::{format_length, MetadataExtractor};
use radio_project::platform;
use radio_project::runner::ToolEvent;
use radio_project::{EditorSession, ProjectDocument, Song, SongField, SongFilter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::Command;

pub struct App {
    pub project: Option<PathBuf>,
    pub config: Config,
    pub config_path: PathBuf,
}

/// Per-field overrides shared by `add-song` and `edit-song`.
#[derive(clap::Args, Debug, Default)]
pub struct SongFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub artist: Option<String>,
    #[arg(long)]
    pub year: Option<String>,
    /// Length as M:SS
    #[arg(long)]
    pub length: Option<String>,
    #[arg(long)]
    pub force: Option<String>,
}

impl SongFields {
    fn pairs(&self) -> [(SongField, Option<&str>); 5] {
        [
            (SongField::Name, self.name.as_deref()),
            (SongField::Artist, self.artist.as_deref()),
            (SongField::Year, self.year.as_deref()),
            (SongField::Length, self.length.as_deref()),
            (SongField::Force, self.force.as_deref()),
        ]
    }

    fn apply(&self, song: &mut Song) {
        for (field, value) in self.pairs() {
            if let Some(value) = value {
                song.set(field, value);
            }
        }
    }
}

impl App {
    fn project_path(&self) -> Result<&Path> {
        self.project
            .as_deref()
            .context("no project file given (use --project FILE)")
    }

    fn open(&self) -> Result<EditorSession> {
        let path = self.project_path()?;
        EditorSession::open(path).with_context(|| format!("failed to open {}", path.display()))
    }

    fn new_session(&self) -> EditorSession {
        EditorSession::new(&self.config.defaults.document_defaults())
    }

    /// Explicit `--tool` first (remembered if it exists), then the config,
    /// then a search of the usual places.
    fn resolve_tool(&mut self, arg: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(tool) = arg {
            if self.config.remember_tool_path(&tool) {
                self.config.save_to(&self.config_path)?;
                info!("Remembered TuneInCrew at {}", tool.display());
            }
            return Ok(tool);
        }
        if let Some(tool) = self.config.tool_path() {
            return Ok(tool.to_path_buf());
        }
        platform::find_tuneincrew_binary()
            .context("TuneInCrew not found; pass --tool or set TUNEINCREW_PATH")
    }
}

fn save(session: &EditorSession) -> Result<()> {
    let path = session.save()?;
    println!("Saved {}", path.display());
    Ok(())
}

pub async fn dispatch(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::New { file, id, name } => {
            if file.exists() {
                bail!("{} already exists", file.display());
            }
            let mut session = app.new_session();
            let doc = session.document_mut();
            if let Some(id) = id {
                doc.set_radio_id(&id);
            }
            if let Some(name) = name {
                doc.set_radio_name(name);
            }
            session.save_as(&file)?;
            println!("Created {}", file.display());
        }

        Command::Show { json } => {
            let session = app.open()?;
            if json {
                println!("{}", serde_json::to_string_pretty(session.document())?);
            } else {
                print_document(session.document());
            }
        }

        Command::Set {
            fmod,
            id,
            name,
            logo,
        } => {
            let mut session = app.open()?;
            let doc = session.document_mut();
            if let Some(fmod) = fmod {
                doc.set_fmod_path(fmod);
            }
            if let Some(id) = id {
                doc.set_radio_id(&id);
                if doc.radio().id() != id {
                    warn!("Radio id cut to {:?}", doc.radio().id());
                }
            }
            if let Some(name) = name {
                doc.set_radio_name(name);
            }
            if let Some(logo) = logo {
                doc.set_radio_logo(logo);
            }
            save(&session)?;
        }

        Command::AddJingle { path } => {
            let mut session = app.open()?;
            let index = session.document_mut().add_jingle(path);
            println!("Jingle {}", index);
            save(&session)?;
        }

        Command::RemoveJingle { index } => {
            let mut session = app.open()?;
            let removed = session
                .document_mut()
                .remove_jingle(index)
                .with_context(|| format!("no jingle at index {}", index))?;
            println!("Removed jingle {}", removed.file_path);
            save(&session)?;
        }

        Command::AddSong { path, fields } => {
            let mut session = app.open()?;
            let mut song = Song::new();
            fields.apply(&mut song);
            let index = session.document_mut().add_song(song);
            let filled = session.set_song_file(index, &path).unwrap_or_default();
            report_filled(index, &filled);
            save(&session)?;
        }

        Command::EditSong {
            index,
            file,
            fields,
        } => {
            let mut session = app.open()?;
            let song = session
                .document_mut()
                .song_mut(index)
                .with_context(|| format!("no song at index {}", index))?;
            fields.apply(song);
            if let Some(file) = file {
                let filled = session.set_song_file(index, &file).unwrap_or_default();
                report_filled(index, &filled);
            }
            save(&session)?;
        }

        Command::RemoveSong { index } => {
            let mut session = app.open()?;
            let removed = session
                .document_mut()
                .remove_song(index)
                .with_context(|| format!("no song at index {}", index))?;
            println!("Removed song {}", removed.file_path());
            save(&session)?;
        }

        Command::Search {
            query,
            case_sensitive,
            save: save_after,
        } => {
            let mut session = app.open()?;
            let total = session.document().songs().len();
            let shown = session.set_filter(SongFilter::new(query, case_sensitive));
            for (index, song) in session.document().songs().iter().enumerate() {
                if song.is_visible() {
                    print_song(index, song);
                }
            }
            println!("{} of {} songs", shown, total);
            if save_after {
                if shown < total {
                    warn!("Saving with {} songs hidden by the search", total - shown);
                    eprintln!("note: {} hidden songs are not written", total - shown);
                }
                save(&session)?;
            }
        }

        Command::Export { file } => {
            let mut session = app.open()?;
            session.save_as(&file)?;
            println!("Saved {}", file.display());
        }

        Command::Meta { file } => {
            let meta = MetadataExtractor::new().extract(&file)?;
            println!("title:  {}", meta.title.as_deref().unwrap_or("-"));
            println!("artist: {}", meta.artist.as_deref().unwrap_or("-"));
            println!("date:   {}", meta.date.as_deref().unwrap_or("-"));
            match meta.duration_secs {
                Some(secs) => println!("length: {}", format_length(secs)),
                None => println!("length: -"),
            }
        }

        Command::Run { tool } => {
            let tool = app.resolve_tool(tool)?;
            let session = match &app.project {
                Some(_) => app.open()?,
                None => app.new_session(),
            };
            run_tool(&session, &tool).await?;
        }

        Command::Config { tool } => {
            if let Some(tool) = tool {
                if !tool.is_file() {
                    bail!("{} is not a file", tool.display());
                }
                if app.config.remember_tool_path(&tool) {
                    app.config.save_to(&app.config_path)?;
                }
            }
            println!("# {}", app.config_path.display());
            print!("{}", toml::to_string_pretty(&app.config)?);
        }
    }
    Ok(())
}

async fn run_tool(session: &EditorSession, tool: &Path) -> Result<()> {
    let mut run = session.run_tool(tool)?;
    println!("Running {} on {}", tool.display(), run.xml_path.display());

    while let Some(event) = run.next_event().await {
        match event {
            ToolEvent::Stdout(line) => println!("{}", line),
            ToolEvent::Stderr(line) => eprintln!("{}", line),
            ToolEvent::Exited { code: Some(0) } => {
                println!("TuneInCrew finished");
                return Ok(());
            }
            ToolEvent::Exited { code } => {
                bail!("TuneInCrew exited with code {:?}", code);
            }
        }
    }
    bail!("TuneInCrew output closed without an exit status")
}

fn report_filled(index: usize, filled: &[SongField]) {
    if filled.is_empty() {
        return;
    }
    let names: Vec<&str> = filled.iter().map(|f| f.tag()).collect();
    println!("Song {}: filled {} from tags", index, names.join(", "));
}

fn print_song(index: usize, song: &Song) {
    println!(
        "{:>3}  {} - {} ({}, {}) force={}  {}",
        index,
        song.artist(),
        song.name(),
        song.year(),
        song.length(),
        song.force(),
        song.file_path()
    );
}

fn print_document(doc: &ProjectDocument) {
    let radio = doc.radio();
    println!("FMOD:  {}", doc.fmod_path());
    println!("Radio: [{}] {}", radio.id(), radio.name());
    println!("Logo:  {}", radio.logo_path());

    println!("\nJingles ({}):", doc.jingles().len());
    for (index, jingle) in doc.jingles().iter().enumerate() {
        println!("{:>3}  {}", index, jingle.file_path);
    }

    println!("\nSongs ({}):", doc.songs().len());
    for (index, song) in doc.songs().iter().enumerate() {
        print_song(index, song);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_in(dir: &Path) -> App {
        App {
            project: Some(dir.join("radio.xml")),
            config: Config::default(),
            config_path: dir.join("config.toml"),
        }
    }

    #[tokio::test]
    async fn test_new_then_edit_song() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        let project = dir.path().join("radio.xml");

        dispatch(
            &mut app,
            Command::New {
                file: project.clone(),
                id: Some("NIGHTS".into()),
                name: None,
            },
        )
        .await
        .unwrap();

        dispatch(
            &mut app,
            Command::AddSong {
                path: "music/a.mp3".into(),
                fields: SongFields {
                    artist: Some("Bob Dylan".into()),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();

        dispatch(
            &mut app,
            Command::EditSong {
                index: 0,
                file: None,
                fields: SongFields {
                    name: Some("Desolation Row".into()),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();

        let session = EditorSession::open(&project).unwrap();
        let doc = session.document();
        assert_eq!(doc.radio().id(), "NIGH");
        assert_eq!(doc.songs().len(), 1);
        assert_eq!(doc.songs()[0].name(), "Desolation Row");
        assert_eq!(doc.songs()[0].artist(), "Bob Dylan");
        assert_eq!(doc.songs()[0].force(), "0");
    }

    #[tokio::test]
    async fn test_new_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        let project = dir.path().join("radio.xml");
        std::fs::write(&project, "keep me").unwrap();

        let result = dispatch(
            &mut app,
            Command::New {
                file: project.clone(),
                id: None,
                name: None,
            },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&project).unwrap(), "keep me");
    }

    #[tokio::test]
    async fn test_missing_index_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        let project = dir.path().join("radio.xml");
        dispatch(
            &mut app,
            Command::New {
                file: project,
                id: None,
                name: None,
            },
        )
        .await
        .unwrap();

        let result = dispatch(&mut app, Command::RemoveSong { index: 3 }).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_tool_remembers_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("TuneInCrew.exe");
        std::fs::write(&tool, b"").unwrap();
        let mut app = app_in(dir.path());

        assert_eq!(app.resolve_tool(Some(tool.clone())).unwrap(), tool);
        assert!(app.config_path.exists());
        assert_eq!(app.resolve_tool(None).unwrap(), tool);

        let saved = Config::load_from(&app.config_path).unwrap();
        assert_eq!(saved.tool.tuneincrew_path, Some(tool));
    }
}
