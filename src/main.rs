use clap::Parser;
use course_desk::config::cli::Command;
use course_desk::core::reconcile::{CourseRow, Snapshot};
use course_desk::core::{CourseFeed, TokenProvider};
use course_desk::utils::{logger, validation::Validate};
use course_desk::{
    adapters, CliConfig, CourseListView, DeskConfig, FileTokenStore, HttpBackend,
    RemoteCourseFeed,
};
use std::sync::Arc;

type View = CourseListView<
    HttpBackend,
    Arc<dyn TokenProvider>,
    Arc<RemoteCourseFeed<HttpBackend, Arc<dyn TokenProvider>>>,
>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(3);
        }
    };

    // 初始化日誌
    logger::init_logger(config.logging.format, cli.verbose);
    if !cli.config.exists() {
        tracing::debug!(
            "{} not found, using built-in defaults",
            cli.config.display()
        );
    }
    tracing::debug!("Effective config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(3);
    }

    if let Command::SetToken { token } = &cli.command {
        return set_token(&config, token);
    }

    let tokens = adapters::token_provider(&config.auth);
    let backend = HttpBackend::new(&config.backend)?;
    let feed = Arc::new(RemoteCourseFeed::new(backend.clone(), Arc::clone(&tokens)));
    let view: View = CourseListView::new(backend, tokens, Arc::clone(&feed), config.viewer_role());

    feed.fetch_courses().await;
    view.mount().await;

    let ok = run_command(&view, cli.command).await;

    print_snapshot(&view);
    if !ok {
        if let Some(message) = view.last_error() {
            eprintln!("❌ {}", message);
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run_command(view: &View, command: Command) -> bool {
    let student = view.role().is_student();
    match command {
        Command::List | Command::SetToken { .. } => true,
        Command::Enroll { id } if student => view.enroll(&view.resolve_id(&id)).await,
        Command::Unenroll { id } if student => view.unenroll(&view.resolve_id(&id)).await,
        Command::Create(fields) if !student => {
            let Some(draft) = fields.into_new_draft() else {
                eprintln!("❌ --name is required to create a course");
                return false;
            };
            view.toggle_edit_form(None);
            view.save_course(draft).await
        }
        Command::Update { id, fields } if !student => {
            let id = view.resolve_id(&id);
            let Some(course) = view.feed().courses().into_iter().find(|c| c.id == id) else {
                eprintln!("❌ No course with id {}", id);
                return false;
            };
            view.toggle_edit_form(Some(course));
            let Some(current) = view.edit_form().draft() else {
                return false;
            };
            view.save_course(fields.apply_to(current)).await
        }
        Command::Remove { id } if !student => view.remove_course(&view.resolve_id(&id)).await,
        _ => {
            eprintln!("❌ That action is not available to the '{}' role", view.role());
            false
        }
    }
}

fn set_token(config: &DeskConfig, token: &str) -> anyhow::Result<()> {
    let course_desk::config::AuthConfig::File { path, key } = &config.auth else {
        anyhow::bail!("set-token needs auth.source = \"file\"");
    };
    let store = FileTokenStore::new(path, key.clone());
    store.save_token(token)?;
    println!("✅ Token stored in {}", store.path().display());
    Ok(())
}

fn print_snapshot(view: &View) {
    match view.snapshot() {
        Snapshot::Loading => println!("Loading courses..."),
        Snapshot::Ready {
            registered,
            available,
        } => {
            if let Some(rows) = registered {
                println!("My Registered Courses");
                print_rows(&rows);
                println!();
            }
            if available.is_empty() {
                println!("No Available Courses");
            } else {
                println!("Available Courses");
                print_rows(&available);
            }
        }
    }
}

fn print_rows(rows: &[CourseRow]) {
    println!(
        "{:<8} {:<28} {:<20} {:<12} {:<10} {:<14} Actions",
        "Id", "Course Name", "Instructor", "Start Date", "Duration", "Level"
    );
    for row in rows {
        let course = &row.course;
        let actions: Vec<&str> = row.actions.iter().map(|a| a.label()).collect();
        let level = match row.category.class_name() {
            "" => course.level.to_string(),
            class => format!("{} [{}]", course.level, class),
        };
        println!(
            "{:<8} {:<28} {:<20} {:<12} {:<10} {:<14} {}",
            course.id.to_string(),
            course.name,
            course.instructor,
            course.display_start_date(),
            course.duration,
            level,
            actions.join("/")
        );
    }
}
