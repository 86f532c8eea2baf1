//! Lullaby - 睡前故事终端客户端
//!
//! 浏览经典故事、生成个性化故事并朗读；
//! 朗读时从标准输入读取 p / r / q 控制暂停、继续和停止。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use lullaby::application::{
    build_narrator, BackendKind, ClassicStoryCard, ControlNarration, ControlNarrationHandler,
    GenerateAdultStory, GenerateAdultStoryHandler, GenerateStory, GenerateStoryHandler,
    GetClassicStory, GetClassicStoryHandler, ListClassicStories, ListClassicStoriesHandler,
    NarrationBackend, NarrationControls, NarratorDeps, PlaybackPort, ReadSource, ReadStory,
    ReadStoryHandler, ResetStory, ResetStoryHandler, RestoreGeneratedStory,
    RestoreGeneratedStoryHandler, RestoredSelection, SpeechSynthesizerPort, StoryApiPort,
    StoryStorePort, TtsEnginePort,
};
use lullaby::config::{load_config_from_path, print_config, AppConfig, StorageKind};
use lullaby::domain::narration::{ControlView, SessionId};
use lullaby::domain::story::{
    sleep_issue_display, AdultStory, ClassicStory, GeneratedStory, PersonalisedStory, StoryKind,
};
use lullaby::infrastructure::adapters::{
    EspeakConfig, EspeakSynthesizer, FakeTtsClient, HttpStoryClient, HttpStoryClientConfig,
    HttpTtsClient, HttpTtsClientConfig, ProcessPlayer, ProcessPlayerConfig, SimulatedPlayer,
    SimulatedPlayerConfig, SimulatedSynthesizer, SimulatedSynthesizerConfig,
};
use lullaby::infrastructure::{EventPublisher, FileStoryStore, InMemoryStoryStore, NarrationEvent};

#[derive(Debug, Parser)]
#[command(name = "lullaby", version, about = "Bedtime stories, read aloud")]
struct Cli {
    /// 配置文件路径（默认搜索 lullaby.toml / lullaby.local.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 不连接 TTS 与音频设备，使用模拟实现
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the classic stories
    Stories,
    /// Show one classic story
    Story {
        id: String,
        /// Read it aloud
        #[arg(long)]
        read: bool,
    },
    /// Generate a personalised story from keywords
    Generate {
        /// Child's name
        #[arg(long)]
        name: String,
        /// Story keyword (repeatable)
        #[arg(short = 'k', long = "keyword", required = true)]
        keywords: Vec<String>,
        #[arg(long)]
        read: bool,
    },
    /// Generate a calming story for adults
    GenerateAdult {
        #[arg(long)]
        name: String,
        /// Predefined sleep issue, e.g. racing_thoughts
        #[arg(long, conflicts_with = "custom_reason")]
        sleep_issue: Option<String>,
        /// Own words for what keeps you awake
        #[arg(long)]
        custom_reason: Option<String>,
        /// Nostalgic memory (repeatable)
        #[arg(long = "memory")]
        memories: Vec<String>,
        #[arg(long)]
        custom_memory: Option<String>,
        #[arg(long)]
        read: bool,
    },
    /// Show the story saved from the last generation
    Restore {
        #[arg(long)]
        adult: bool,
        #[arg(long)]
        read: bool,
    },
    /// Forget the saved story and start over
    Reset {
        #[arg(long)]
        adult: bool,
    },
    /// Read a plain text file aloud
    Read { file: PathBuf },
}

/// 组装好的依赖
struct App {
    story_api: Arc<dyn StoryApiPort>,
    story_store: Arc<dyn StoryStorePort>,
    tts: Arc<dyn TtsEnginePort>,
    narrator: Arc<dyn NarrationBackend>,
    events: Arc<EventPublisher>,
}

impl App {
    fn build(config: &AppConfig, offline: bool) -> anyhow::Result<Self> {
        let story_api = Arc::new(HttpStoryClient::new(
            HttpStoryClientConfig::new(config.api.base_url.clone())
                .with_timeout(config.api.timeout_secs),
        )?);

        let story_store: Arc<dyn StoryStorePort> = match config.storage.kind {
            StorageKind::Memory => Arc::new(InMemoryStoryStore::new()),
            StorageKind::File => Arc::new(FileStoryStore::new(&config.storage.session_dir)?),
        };

        let (tts, playback, synthesizer): (
            Arc<dyn TtsEnginePort>,
            Arc<dyn PlaybackPort>,
            Arc<dyn SpeechSynthesizerPort>,
        ) = if offline {
            tracing::info!("Offline mode: simulated audio");
            (
                Arc::new(FakeTtsClient::with_defaults()),
                Arc::new(SimulatedPlayer::new(SimulatedPlayerConfig::default())),
                Arc::new(SimulatedSynthesizer::new(SimulatedSynthesizerConfig::default())),
            )
        } else {
            let tts = HttpTtsClient::new(HttpTtsClientConfig {
                base_url: config.api.base_url.clone(),
                timeout_secs: config.api.timeout_secs,
            })?;
            (
                Arc::new(tts),
                Arc::new(ProcessPlayer::new(ProcessPlayerConfig {
                    command: config.player.command.clone(),
                    args: config.player.args.clone(),
                })),
                Arc::new(EspeakSynthesizer::new(EspeakConfig {
                    command: config.speech.command.clone(),
                })),
            )
        };

        let events = Arc::new(EventPublisher::new());
        let controls: Arc<dyn NarrationControls> = events.clone();
        let narrator = build_narrator(
            &config.narrator_config(),
            NarratorDeps {
                tts: tts.clone(),
                playback,
                synthesizer,
                controls,
            },
        );

        Ok(Self {
            story_api,
            story_store,
            tts,
            narrator,
            events,
        })
    }

    /// 朗读并处理终端控制，直到会话回到空闲
    async fn narrate(&self, source: ReadSource) -> anyhow::Result<()> {
        if self.narrator.kind() == BackendKind::Remote && !self.tts.health_check().await {
            tracing::warn!("TTS service did not answer the health check");
        }
        let mut events = self.events.subscribe_global();

        let session_id = match ReadStoryHandler::new(self.narrator.clone())
            .handle(ReadStory { source })
            .await
        {
            Ok(session_id) => session_id,
            Err(e) => {
                while let Ok(event) = events.try_recv() {
                    print_event(None, &event);
                }
                return Err(e.into());
            }
        };

        println!("(p = pause, r = resume, q = stop)");
        let controls = ControlNarrationHandler::new(self.narrator.clone());
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => {
                        if print_event(Some(session_id), &event) {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Missed narration events");
                    }
                    Err(RecvError::Closed) => break,
                },
                line = stdin.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => {
                        let command = match line.trim() {
                            "p" => ControlNarration::Pause,
                            "r" => ControlNarration::Resume,
                            "q" => ControlNarration::Cancel,
                            "" => continue,
                            other => {
                                println!("Unknown command: {}", other);
                                continue;
                            }
                        };
                        if let Err(e) = controls.handle(command).await {
                            println!("{}", e);
                        }
                    }
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read stdin");
                        stdin_open = false;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received interrupt");
                    self.narrator.cancel().await;
                    break;
                }
            }
        }

        Ok(())
    }
}

/// 打印一个事件；返回 true 表示该会话已结束
fn print_event(session: Option<SessionId>, event: &NarrationEvent) -> bool {
    match event {
        NarrationEvent::Alert { message, .. } => {
            eprintln!("! {}", message);
            false
        }
        NarrationEvent::ViewChanged { session_id, view } if Some(*session_id) == session => {
            match view {
                ControlView::Idle => println!("[{}]", view.start_label()),
                ControlView::Generating | ControlView::Loading => {
                    println!("{}", view.start_label())
                }
                ControlView::Playing | ControlView::Paused => {
                    println!("[{}]", view.pause_label())
                }
            }
            *view == ControlView::Idle
        }
        NarrationEvent::SegmentStarted {
            session_id,
            index,
            total,
        } if Some(*session_id) == session => {
            println!("  part {} of {}", index + 1, total);
            false
        }
        NarrationEvent::Finished { session_id } if Some(*session_id) == session => {
            println!("The end. Sweet dreams.");
            false
        }
        _ => false,
    }
}

fn print_classic(story: &ClassicStory) {
    println!("{}\n", story.display_title());
    println!("{}", story.content.as_deref().unwrap_or("No content available"));
}

fn print_personalised(story: &PersonalisedStory) {
    println!("{}", story.title);
    println!("Starring: {}", story.starring());
    if !story.keywords.is_empty() {
        println!("Keywords: {}", story.keywords.join(", "));
    }
    println!("\n{}", story.content);
}

fn print_adult(story: &AdultStory) {
    let display = if story.sleep_issue_display.is_empty() {
        sleep_issue_display(
            story.sleep_issue.as_deref(),
            Some(story.custom_sleep_reason.as_str()),
        )
    } else {
        story.sleep_issue_display.clone()
    };
    println!("{}", story.title);
    println!("Created for: {}", story.created_for());
    println!("Sleep issue: {}", display);
    println!("\n{}", story.content);
}

fn print_generated(story: &GeneratedStory) {
    match story {
        GeneratedStory::Personalised(s) => print_personalised(s),
        GeneratedStory::Adult(s) => print_adult(s),
    }
}

fn kind_for(adult: bool) -> StoryKind {
    if adult {
        StoryKind::Adult
    } else {
        StoryKind::Personalised
    }
}

async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let app = App::build(&config, cli.offline)?;

    match cli.command {
        Commands::Stories => {
            let stories = ListClassicStoriesHandler::new(app.story_api.clone())
                .handle(ListClassicStories)
                .await?;
            if stories.is_empty() {
                println!("No stories available.");
            }
            for story in &stories {
                let card = ClassicStoryCard::from(story);
                println!("{:>4}  {}\n      {}", card.id, card.title, card.preview);
            }
        }
        Commands::Story { id, read } => {
            let story = GetClassicStoryHandler::new(app.story_api.clone())
                .handle(GetClassicStory { story_id: id })
                .await?;
            print_classic(&story);
            if read {
                app.narrate(ReadSource::Classic(story)).await?;
            }
        }
        Commands::Generate {
            name,
            keywords,
            read,
        } => {
            let story = GenerateStoryHandler::new(app.story_api.clone(), app.story_store.clone())
                .handle(GenerateStory {
                    keywords,
                    child_name: name,
                })
                .await?;
            print_personalised(&story);
            if read {
                app.narrate(ReadSource::Generated(GeneratedStory::Personalised(story)))
                    .await?;
            }
        }
        Commands::GenerateAdult {
            name,
            sleep_issue,
            custom_reason,
            memories,
            custom_memory,
            read,
        } => {
            let story =
                GenerateAdultStoryHandler::new(app.story_api.clone(), app.story_store.clone())
                    .handle(GenerateAdultStory {
                        sleep_issue,
                        custom_sleep_reason: custom_reason,
                        memories,
                        custom_memory,
                        adult_name: name,
                    })
                    .await?;
            print_adult(&story);
            if read {
                app.narrate(ReadSource::Generated(GeneratedStory::Adult(story)))
                    .await?;
            }
        }
        Commands::Restore { adult, read } => {
            let restored = RestoreGeneratedStoryHandler::new(app.story_store.clone())
                .handle(RestoreGeneratedStory {
                    kind: kind_for(adult),
                })
                .await?;
            let Some(restored) = restored else {
                println!("No saved story. Generate one first.");
                return Ok(());
            };
            match &restored.selection {
                RestoredSelection::Keywords(selection) => {
                    println!("Selected: {}", selection.keywords().join(", "))
                }
                RestoredSelection::Sleep(selection) => {
                    println!("Selected: {}", selection.labels().join(", "))
                }
            }
            print_generated(&restored.story);
            if read {
                app.narrate(ReadSource::Generated(restored.story)).await?;
            }
        }
        Commands::Reset { adult } => {
            ResetStoryHandler::new(app.story_store.clone(), app.narrator.clone())
                .handle(ResetStory {
                    kind: kind_for(adult),
                })
                .await?;
            println!("Ready for a new story.");
        }
        Commands::Read { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            app.narrate(ReadSource::Text(text)).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config_from_path(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 日志写到 stderr，stdout 留给故事内容
    let log_filter = format!("{},lullaby={}", config.log.level, config.log.level);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    print_config(&config);

    run(cli, config).await
}
