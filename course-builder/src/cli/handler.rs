//! Command handler: load the course, apply one command, wait for its batch

use anyhow::{Context, Result};
use colored::*;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use super::{Cli, Commands, outline};
use crate::api::models::{CourseId, MaterialDraft, MaterialId, SectionId, SectionPatch};
use crate::api::{CourseClient, RemoteStore};
use crate::builder::{BuilderEvent, CourseBuilder, DragOutcome, SyncReport};
use crate::config::Config;

/// Run a parsed command against the configured backend
pub async fn handle_command(cli: Cli, config: Config) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let Some(course) = cli.course else {
        anyhow::bail!("--course is required (or set COURSE_BUILDER_COURSE)");
    };

    let client = CourseClient::new(&config.api).context("Failed to create API client")?;
    log::debug!("Using backend at {}", client.base_url());
    let remote: Arc<dyn RemoteStore> = Arc::new(client);

    run(remote, config, CourseId(course), cli.command).await
}

/// Same as `handle_command`, against any remote store
pub async fn run(
    remote: Arc<dyn RemoteStore>,
    config: Config,
    course: CourseId,
    command: Commands,
) -> Result<()> {
    let (mut builder, mut events) = CourseBuilder::new(course, remote, config.sync.clone());
    builder.load().await?;

    let pending = apply(&mut builder, command).await?;
    let failed = match pending {
        Some(handle) => {
            let report = handle.await.context("Sync task panicked")?;
            summarize(&report);
            !report.is_success()
        }
        None => false,
    };

    drain_notices(&mut events);
    outline::print(&builder.snapshot());

    if failed {
        anyhow::bail!("Some updates were not saved");
    }
    Ok(())
}

async fn apply(builder: &mut CourseBuilder, command: Commands) -> Result<Option<JoinHandle<SyncReport>>> {
    match command {
        Commands::Show => Ok(None),
        Commands::Move { item, onto } => {
            let result = builder.move_item(item, onto)?;
            match result.outcome {
                DragOutcome::Committed { mv, updates } => {
                    println!(
                        "{} {} ({} update{})",
                        "Moved".green(),
                        item,
                        updates,
                        if updates == 1 { "" } else { "s" }
                    );
                    log::debug!("Applied {:?}", mv);
                }
                DragOutcome::NoOp | DragOutcome::Cancelled => {
                    println!("{} dropping {} onto {} changes nothing", "Skipped:".yellow(), item, onto);
                }
            }
            Ok(result.pending)
        }
        Commands::AddSection { title, description } => {
            let section = builder.add_section(&title, description).await?;
            println!("{} {} at position {}", "Created".green(), section.id, section.order);
            Ok(None)
        }
        Commands::AddMaterial {
            section,
            title,
            material_type,
            url,
            duration,
            required,
            description,
        } => {
            let draft = MaterialDraft {
                title,
                description,
                material_type,
                url,
                duration,
                is_required: required,
            };
            let material = builder.add_material(SectionId(section), draft).await?;
            println!(
                "{} {} in {} at position {}",
                "Created".green(),
                material.id,
                material.section_id,
                material.order
            );
            Ok(None)
        }
        Commands::EditSection {
            id,
            title,
            description,
        } => {
            let section = builder
                .edit_section(SectionId(id), SectionPatch { title, description })
                .await?;
            println!("{} {}", "Updated".green(), section.id);
            Ok(None)
        }
        Commands::EditMaterial {
            id,
            title,
            material_type,
            url,
            duration,
            required,
            description,
        } => {
            let draft = MaterialDraft {
                title,
                description,
                material_type,
                url,
                duration,
                is_required: required,
            };
            let material = builder.edit_material(MaterialId(id), draft).await?;
            println!(
                "{} {} in {} at position {}",
                "Updated".green(),
                material.id,
                material.section_id,
                material.order
            );
            Ok(None)
        }
        Commands::DeleteSection { id } => {
            let pending = builder.delete_section(SectionId(id)).await?;
            println!("{} section {}", "Deleted".green(), id);
            Ok(pending)
        }
        Commands::DeleteMaterial { id } => {
            let pending = builder.delete_material(MaterialId(id)).await?;
            println!("{} material {}", "Deleted".green(), id);
            Ok(pending)
        }
    }
}

fn summarize(report: &SyncReport) {
    if report.is_success() {
        println!(
            "{} {} update(s) in {}ms",
            "Saved".green(),
            report.results.len(),
            report.duration_ms
        );
    }
}

fn drain_notices(events: &mut UnboundedReceiver<BuilderEvent>) {
    while let Ok(event) = events.try_recv() {
        if let BuilderEvent::Notice(notice) = event {
            outline::print_notice(&notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ItemRef;
    use crate::api::models::MaterialType;
    use crate::testing::{COURSE, MockRemote, material, section};

    #[tokio::test]
    async fn test_run_move_persists() {
        let remote = Arc::new(MockRemote::with_course(
            vec![section(1, 1), section(2, 2)],
            vec![material(1, 1, 1)],
        ));

        run(
            remote.clone(),
            Config::default(),
            COURSE,
            Commands::Move {
                item: ItemRef::Material(MaterialId(1)),
                onto: ItemRef::Section(SectionId(2)),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            remote.remote_material(MaterialId(1)).unwrap().section_id,
            SectionId(2)
        );
    }

    #[tokio::test]
    async fn test_run_reports_failed_batch() {
        let remote = Arc::new(MockRemote::with_course(
            vec![section(1, 1), section(2, 2)],
            vec![],
        ));
        remote.fail_section(SectionId(2));

        let result = run(
            remote.clone(),
            Config::default(),
            COURSE,
            Commands::Move {
                item: ItemRef::Section(SectionId(2)),
                onto: ItemRef::Section(SectionId(1)),
            },
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_show_issues_no_updates() {
        let remote = Arc::new(MockRemote::with_course(vec![section(1, 1)], vec![]));

        run(remote.clone(), Config::default(), COURSE, Commands::Show)
            .await
            .unwrap();

        assert_eq!(remote.calls(), vec!["list_sections", "list_materials"]);
    }

    #[tokio::test]
    async fn test_run_edit_material_updates_content() {
        let remote = Arc::new(MockRemote::with_course(
            vec![section(1, 1)],
            vec![material(1, 1, 1), material(2, 1, 2)],
        ));

        run(
            remote.clone(),
            Config::default(),
            COURSE,
            Commands::EditMaterial {
                id: 2,
                title: "Slides".to_string(),
                material_type: MaterialType::Pdf,
                url: "https://example.org/slides.pdf".to_string(),
                duration: Some(60),
                required: true,
                description: None,
            },
        )
        .await
        .unwrap();

        let edited = remote.remote_material(MaterialId(2)).unwrap();
        assert_eq!(edited.title, "Slides");
        assert_eq!(edited.material_type, MaterialType::Pdf);
        // duration only applies to videos
        assert_eq!(edited.duration, None);
        assert_eq!(edited.order, 2);
        assert_eq!(remote.call_count("update_material_order"), 0);
    }
}
