#![deny(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use contentdesk::{
    application::{
        content::{ContentClient, ContentRecord},
        draft::{
            CancelOutcome, CompleteOutcome, DraftEditor, DraftEditorOptions, DraftExtra,
            UploadOutcome,
        },
        edit::{ContentEditor, entity_projection},
        error::AppError,
        repos::{DraftApi, PublishedApi},
        shell::Shell,
        uploads::MediaFile,
    },
    domain::{
        drafts::{DraftFields, games_update_problem},
        entities::DraftEntity,
    },
};
use contentdesk_api_types::{ContentPatch, ListQuery, PlatformLink, StatusFilter};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::args::{ContentCmd, DraftFieldArgs, EditFieldArgs};
use crate::client::{CliError, Ctx};
use crate::io::{parse_platforms, read_opt_value};
use crate::print::print_json;

const CONFIRM_DELETE: &str = "정말 삭제할까요?";

pub async fn handle<T>(ctx: &Ctx, client: &ContentClient<T>, cmd: ContentCmd) -> Result<(), CliError>
where
    T: ContentRecord + Serialize,
{
    match cmd {
        ContentCmd::List {
            status,
            page,
            page_size,
        } => {
            let query = ListQuery {
                status: status.into(),
                page,
                page_size,
            };
            print_json(&client.list(query).await?)
        }
        ContentCmd::Get { id } => print_json(&client.get(id).await?),
        ContentCmd::Delete { id } => delete(ctx, client, id).await,
        ContentCmd::Activate { id } => set_active(client, id, true).await,
        ContentCmd::Deactivate { id } => set_active(client, id, false).await,
        ContentCmd::Reorder {
            ids,
            page,
            page_size,
        } => {
            client.reorder(&ids, page, page_size).await?;
            print_json(&json!({ "ids": ids, "page": page, "pageSize": page_size }))
        }
        ContentCmd::Move {
            id,
            to,
            page,
            page_size,
        } => move_item(client, id, to, page, page_size).await,
        ContentCmd::Create(fields) => create(ctx, client, fields).await,
        ContentCmd::Edit { id, fields } => edit(ctx, client, id, fields).await,
    }
}

async fn delete<T: ContentRecord>(
    ctx: &Ctx,
    client: &ContentClient<T>,
    id: i64,
) -> Result<(), CliError> {
    if !ctx.shell().confirm(CONFIRM_DELETE) {
        return Ok(());
    }
    client.delete(id).await?;
    print_json(&json!({ "id": id, "deleted": true }))
}

async fn set_active<T: ContentRecord>(
    client: &ContentClient<T>,
    id: i64,
    active: bool,
) -> Result<(), CliError> {
    if active {
        client.activate(id).await?;
    } else {
        client.deactivate(id).await?;
    }
    print_json(&json!({ "id": id, "active": active }))
}

/// The valid range for `to` is the number of items currently on `page`.
async fn move_item<T: ContentRecord>(
    client: &ContentClient<T>,
    id: i64,
    to: i64,
    page: u32,
    page_size: u32,
) -> Result<(), CliError> {
    let listed = client
        .list(ListQuery {
            status: StatusFilter::All,
            page,
            page_size,
        })
        .await?;
    client
        .reorder_direct(id, to, listed.items.len(), page, page_size)
        .await?;
    print_json(&json!({ "id": id, "order": to }))
}

/// Open (or resume) the draft, fill it in and publish it.
async fn create<T>(ctx: &Ctx, client: &ContentClient<T>, args: DraftFieldArgs) -> Result<(), CliError>
where
    T: ContentRecord + Serialize,
{
    let resource = T::RESOURCE;
    let content = read_opt_value(args.content, args.content_file)?;
    let platform_links = parse_platforms(&args.platforms)?;
    reject_unsupported(&args.hashtags, resource.uses_hashtags, "--hashtag")?;
    reject_unsupported(&platform_links, resource.uses_platform_links, "--platform")?;

    let api: Arc<dyn DraftApi<T>> = Arc::new(client.clone());
    let shell: Arc<dyn Shell> = ctx.shell.clone();
    let options = DraftEditorOptions::for_record(api, ctx.client.uploader(), shell)
        .with_debounce(ctx.settings.editor.autosave_debounce);
    let editor = DraftEditor::new(options);
    let draft_id = editor.activate().await?;
    info!(resource = resource.path, draft_id, "editing draft");

    if args.discard {
        return match editor.cancel().await {
            CancelOutcome::Deleted | CancelOutcome::Left => {
                print_json(&json!({ "draftId": draft_id, "deleted": true }))
            }
            CancelOutcome::Declined => Ok(()),
            CancelOutcome::Failed(err) => Err(err.into()),
        };
    }

    if let Some(title) = args.title {
        editor.set_title(title);
    }
    if let Some(content) = content {
        editor.set_content(content);
    }
    if !args.hashtags.is_empty() {
        editor.set_hashtags(args.hashtags);
    }
    if !platform_links.is_empty() {
        editor.set_platform_links(platform_links);
    }
    editor.autosave(DraftExtra::default());

    if let Some(path) = args.file {
        let media = MediaFile::from_path(&path).await?;
        if let UploadOutcome::Failed(err) = editor.upload(media, resource.upload_type).await {
            return Err(err.into());
        }
    }

    match editor.complete(Some(resource.completion)).await {
        CompleteOutcome::Completed(item) => print_json(&item),
        CompleteOutcome::Blocked(message) => Err(AppError::validation(message).into()),
        CompleteOutcome::Failed(err) => Err(err.into()),
    }
}

async fn edit<T>(
    ctx: &Ctx,
    client: &ContentClient<T>,
    id: i64,
    args: EditFieldArgs,
) -> Result<(), CliError>
where
    T: ContentRecord + Serialize,
{
    let resource = T::RESOURCE;
    let content = read_opt_value(args.content, args.content_file)?;
    let new_links = parse_platforms(&args.platforms)?;
    reject_unsupported(&new_links, resource.uses_platform_links, "--platform")?;

    let api: Arc<dyn PublishedApi<T>> = Arc::new(client.clone());
    let mut editor = ContentEditor::new(api, entity_projection::<T>());
    let raw_id = id.to_string();
    let Some(current) = editor.load(Some(raw_id.as_str())).await.cloned() else {
        return Err(AppError::NotFound.into());
    };

    if let Some(title) = args.title {
        editor.set_title(title);
    }
    if let Some(content) = content {
        editor.set_content(content);
    }

    if !editor.is_dirty() && new_links.is_empty() {
        ctx.shell().notify("nothing to change");
        return print_json(&current);
    }

    if resource.uses_platform_links {
        let links = if new_links.is_empty() {
            current.platform_links().map(<[PlatformLink]>::to_vec).unwrap_or_default()
        } else {
            new_links
        };
        let file_id = current.first_file().map(|file| file.id);
        let fields = DraftFields {
            title: editor.title().to_string(),
            content: editor.content().to_string(),
            file_id,
            hashtags: Vec::new(),
            platform_links: links.clone(),
        };
        if let Some(problem) = games_update_problem(&fields) {
            return Err(AppError::validation(problem).into());
        }
        editor = editor.with_patch_builder(move |title, content| ContentPatch {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            file_id,
            platform_links: Some(links.clone()),
            ..ContentPatch::default()
        });
    }

    let saved = editor.save().await?;
    print_json(saved)
}

fn reject_unsupported<V>(values: &[V], supported: bool, flag: &str) -> Result<(), CliError> {
    if !values.is_empty() && !supported {
        return Err(CliError::InvalidInput(format!(
            "{flag} is not accepted by this content type"
        )));
    }
    Ok(())
}
