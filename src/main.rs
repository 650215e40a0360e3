use chrono::NaiveDate;

use memento::config::AppConfig;
use memento::core::countdown::{self, Ticker};
use memento::core::goal::Goal;
use memento::core::life;
use memento::core::profile::{Sex, UserProfile};
use memento::core::progress::{goal_progress, progress_label};
use memento::core::time_tracking::{format_hours, time_analysis_now};
use memento::storage::Storage;
use memento::store::AppStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Log to the systemd user journal (`journalctl --user -t memento -f`);
    // quietly skip when no journal is available.
    if let Ok(journal) = systemd_journal_logger::JournalLog::new() {
        let _ = journal.with_syslog_identifier("memento".to_string()).install();
        log::set_max_level(log::LevelFilter::Info);
    }

    let config = AppConfig::default();
    config.ensure_dirs()?;
    let mut store = AppStore::load(Storage::new(config.state_path()));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg = |i: usize| args.get(i).map(String::as_str);

    match arg(0) {
        None | Some("status") => status(&store),
        Some("profile") => {
            let (Some(date), Some(sex)) = (arg(1), arg(2)) else {
                eprintln!("usage: memento profile <yyyy-mm-dd> <male|female> [COUNTRY]");
                std::process::exit(2);
            };
            let birth = parse_date(date)?;
            let Some(sex) = Sex::parse(sex) else {
                eprintln!("sex must be 'male' or 'female'");
                std::process::exit(2);
            };
            let nationality = arg(3).map(str::to_uppercase);
            let profile = UserProfile {
                birth_date: birth.and_hms_opt(0, 0, 0).unwrap(),
                sex,
                life_expectancy_years: life::life_expectancy_for_country(nationality.as_deref()),
                nationality_code: nationality,
            };
            store.set_profile(profile);
            status(&store);
        }
        Some("add") => {
            let (Some(title), Some(date)) = (arg(1), arg(2)) else {
                eprintln!("usage: memento add <title> <yyyy-mm-dd> [HH:MM]");
                std::process::exit(2);
            };
            if title.is_empty() || title.chars().count() > 100 {
                eprintln!("title must be 1-100 characters");
                std::process::exit(2);
            }
            let time = arg(3).map(parse_time).transpose()?;
            let deadline = life::deadline_from_date(parse_date(date)?, time);
            let id = store.add_goal(Goal::new(title, deadline));
            println!("added goal {}", id);
        }
        Some("done") => {
            let id = require_goal(&store, arg(1));
            store.complete_goal(&id);
        }
        Some("restore") => {
            let id = require_goal(&store, arg(1));
            store.restore_goal(&id);
        }
        Some("rm") => {
            let id = require_goal(&store, arg(1));
            store.delete_goal(&id);
        }
        Some("sub") => {
            let (Some(goal), Some(title)) = (arg(1), arg(2)) else {
                eprintln!("usage: memento sub <goal-id> <title>");
                std::process::exit(2);
            };
            let Some(id) = resolve_goal(&store, goal) else {
                eprintln!("no goal matching '{}'", goal);
                std::process::exit(1);
            };
            match store.add_sub_goal(&id, title) {
                Some(sub_id) => println!("added sub-goal {}", sub_id),
                None => eprintln!("no goal matching '{}'", goal),
            }
        }
        Some("check") => {
            let (Some(goal), Some(sub)) = (arg(1), arg(2)) else {
                eprintln!("usage: memento check <goal-id> <sub-goal-id>");
                std::process::exit(2);
            };
            let Some(id) = resolve_goal(&store, goal) else {
                eprintln!("no goal matching '{}'", goal);
                std::process::exit(1);
            };
            store.toggle_sub_goal(&id, sub);
        }
        Some("log") => {
            let (Some(goal), Some(hours)) = (arg(1), arg(2)) else {
                eprintln!("usage: memento log <goal-id> <hours> [description]");
                std::process::exit(2);
            };
            let hours: f64 = hours.parse()?;
            if !(hours > 0.0 && hours <= 24.0) {
                eprintln!("hours must be greater than 0 and at most 24");
                std::process::exit(2);
            }
            let description = arg(3).map(str::to_string);
            let Some(id) = resolve_goal(&store, goal) else {
                eprintln!("no goal matching '{}'", goal);
                std::process::exit(1);
            };
            store.add_work_session(&id, hours, description);
        }
        Some("watch") => watch(&store),
        Some("export") => println!("{}", store.export_data()),
        Some("import") => {
            let Some(path) = arg(1) else {
                eprintln!("usage: memento import <file>");
                std::process::exit(2);
            };
            let json = std::fs::read_to_string(path)?;
            if store.import_data(&json) {
                println!("imported {} goals", store.goals().len());
            } else {
                eprintln!("import failed: malformed backup");
                std::process::exit(1);
            }
        }
        Some(other) => {
            eprintln!("unknown command '{}'", other);
            eprintln!(
                "commands: status profile add done restore rm sub check log watch export import"
            );
            std::process::exit(2);
        }
    }

    Ok(())
}

fn require_goal(store: &AppStore, arg: Option<&str>) -> String {
    let Some(prefix) = arg else {
        eprintln!("missing goal id");
        std::process::exit(2);
    };
    match resolve_goal(store, prefix) {
        Some(id) => id,
        None => {
            eprintln!("no goal matching '{}'", prefix);
            std::process::exit(1);
        }
    }
}

/// Match a goal by full id or unambiguous id prefix.
fn resolve_goal(store: &AppStore, prefix: &str) -> Option<String> {
    let matches: Vec<&Goal> = store
        .goals()
        .iter()
        .filter(|g| g.id.starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [only] => Some(only.id.clone()),
        _ => None,
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
}

fn parse_time(s: &str) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    let (h, m) = s.split_once(':').ok_or("time must be HH:MM")?;
    let hour: u32 = h.parse()?;
    let minute: u32 = m.parse()?;
    if hour > 23 || minute > 59 {
        return Err("time must be HH:MM".into());
    }
    Ok((hour, minute))
}

fn status(store: &AppStore) {
    match store.profile() {
        Some(profile) => {
            let now = memento::core::now();
            let time = life::life_countdown(profile, now);
            println!(
                "age {}, estimated time left: {}",
                life::age(profile.birth_date, now),
                countdown::format_countdown(&time)
            );
        }
        None => println!("no profile set (memento profile <yyyy-mm-dd> <male|female> [COUNTRY])"),
    }

    if store.goals().is_empty() {
        println!("no goals yet");
        return;
    }

    println!();
    for goal in store.goals() {
        let progress = goal_progress(goal);
        let time = countdown::signed_delta_now(goal.deadline);
        let mut line = format!(
            "{:>8}  [{:>3}%] {}  ({})",
            &goal.id[..8.min(goal.id.len())],
            progress.percentage,
            goal.title,
            progress_label(&progress)
        );
        if countdown::is_urgent(&time) {
            line.push_str("  !urgent");
        }
        line.push_str(&format!("  {}", countdown::format_time_left(&time)));
        if goal.estimated_hours.is_some() {
            let analysis = time_analysis_now(goal);
            line.push_str(&format!(
                "  worked {} of {}{}",
                format_hours(analysis.total_worked_hours),
                format_hours(analysis.estimated_hours),
                if analysis.is_on_track { "" } else { ", behind" }
            ));
        }
        println!("{}", line);
    }
}

/// Live life countdown, redrawn every second until Enter is pressed. The
/// ticker owns the refresh thread and is cancelled on every exit path by
/// dropping the handle.
fn watch(store: &AppStore) {
    let Some(profile) = store.profile().cloned() else {
        println!("no profile set");
        return;
    };
    let ticker = Ticker::every_second(move || {
        let time = life::life_countdown(&profile, memento::core::now());
        print!("\r{}    ", countdown::format_countdown(&time));
        let _ = std::io::Write::flush(&mut std::io::stdout());
    });

    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
    drop(ticker);
    println!();
}
