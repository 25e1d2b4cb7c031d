use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use wp_repo::{FieldErrors, Project, Social, Update, User, WeekProject};

use crate::cli::*;
use crate::config::load_config;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), cli.db)?;
    let path = config.path.clone();
    let week = WeekProject::open(config)
        .with_context(|| format!("opening store at {}", path.display()))?;

    let format = cli.format;
    let result = match cli.command {
        Command::Social(args) => cmd_social(&week, format, args.action),
        Command::User(args) => cmd_user(&week, format, args.action),
        Command::Project(args) => cmd_project(&week, format, args.action),
        Command::Update(args) => cmd_update(&week, format, args.action),
    };
    week.close();
    result
}

fn cmd_social(week: &WeekProject, format: OutputFormat, action: SocialAction) -> anyhow::Result<()> {
    match action {
        SocialAction::Add { provider, id, name } => {
            let social = week.insert_social(Social::new(&provider, &id, name))?;
            emit(format, &social, |s| {
                println!("{} Stored social {} ({})", "✓".green().bold(), s.id.yellow(), s.name);
            })
        }
        SocialAction::Show { id } => {
            let social = week
                .get_social(&id)?
                .with_context(|| format!("social {id} not found"))?;
            emit(format, &social, print_social)
        }
    }
}

fn cmd_user(week: &WeekProject, format: OutputFormat, action: UserAction) -> anyhow::Result<()> {
    match action {
        UserAction::Add { name, title, email } => {
            let user = week.insert_user(User::new(name, title, email))?;
            emit(format, &user, |u| {
                println!("{} Stored user {}", "✓".green().bold(), u.name.yellow());
            })
        }
        UserAction::Show { name } => {
            let user = week
                .get_user(&name)?
                .with_context(|| format!("user {name} not found"))?;
            emit(format, &user, print_user)
        }
        UserAction::List => {
            let users = week.list_users()?;
            emit(format, &users, |users| {
                if users.is_empty() {
                    println!("No users.");
                }
                users.iter().for_each(print_user);
            })
        }
    }
}

fn cmd_project(week: &WeekProject, format: OutputFormat, action: ProjectAction) -> anyhow::Result<()> {
    match action {
        ProjectAction::New { owner, title, content } => {
            match week.insert_project(Project::new(owner, title, content))? {
                Ok(project) => emit(format, &project, |p| {
                    println!("{} Created project {}/{}", "✓".green().bold(), p.owner, p.name.yellow());
                }),
                Err(errors) => rejected(format, "project", &errors),
            }
        }
        ProjectAction::Show { owner, name } => {
            let project = week
                .get_project(&owner, &name)?
                .with_context(|| format!("project {owner}/{name} not found"))?;
            emit(format, &project, print_project)
        }
        ProjectAction::List { owner } => {
            let projects = week.list_projects(&owner)?;
            emit(format, &projects, |projects| {
                if projects.is_empty() {
                    println!("No projects for {}.", owner.bold());
                }
                projects.iter().for_each(print_project);
            })
        }
    }
}

fn cmd_update(week: &WeekProject, format: OutputFormat, action: UpdateAction) -> anyhow::Result<()> {
    match action {
        UpdateAction::Add { owner, project, progress, status } => {
            let target = Project {
                owner,
                name: project,
                ..Default::default()
            };
            match week.append_update(&target, Update::new(progress, status))? {
                Ok(update) => emit(format, &update, |u| {
                    println!(
                        "{} {}/{} now at {}%",
                        "✓".green().bold(),
                        target.owner,
                        target.name.yellow(),
                        u.progress.to_string().bold(),
                    );
                }),
                Err(errors) => rejected(format, "update", &errors),
            }
        }
        UpdateAction::List { owner, project } => {
            let updates = week.list_updates(&owner, &project)?;
            emit(format, &updates, |updates| {
                if updates.is_empty() {
                    println!("No updates for {}/{}.", owner, project.yellow());
                }
                for u in updates {
                    println!(
                        "{}  {:>3}%  {}",
                        u.inserted.to_rfc3339().dimmed(),
                        u.progress,
                        u.status,
                    );
                }
            })
        }
    }
}

/// Print `value` as JSON, or hand it to `text` for the human format.
fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce(&T)) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(value),
    }
    Ok(())
}

fn rejected(format: OutputFormat, what: &str, errors: &FieldErrors) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "errors": errors }))?);
        }
        OutputFormat::Text => {
            for (field, message) in errors.iter() {
                println!("  {} {}: {}", "✗".red(), field.bold(), message);
            }
        }
    }
    anyhow::bail!("invalid {what}: {errors}")
}

fn print_social(social: &Social) {
    println!("{}  {}", social.id.yellow().bold(), social.name);
}

fn print_user(user: &User) {
    println!("{}  {}  {}", user.name.yellow().bold(), user.title, user.email.blue());
}

fn print_project(project: &Project) {
    println!(
        "{}/{}  {:>3}%  {}",
        project.owner,
        project.name.yellow().bold(),
        project.progress,
        project.title,
    );
    if !project.content.is_empty() {
        println!("  {}", project.content.dimmed());
    }
}
