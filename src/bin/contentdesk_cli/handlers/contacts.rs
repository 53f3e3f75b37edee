#![deny(clippy::all, clippy::pedantic)]

use contentdesk_api_types::ListQuery;

use crate::args::ContactsCmd;
use crate::client::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: ContactsCmd) -> Result<(), CliError> {
    match cmd {
        ContactsCmd::List { page, page_size } => {
            let query = ListQuery {
                page,
                page_size,
                ..ListQuery::default()
            };
            let contacts = ctx.client.contacts.list(query).await?;
            print_json(&contacts)
        }
        ContactsCmd::Get { id } => print_json(&ctx.client.contacts.get(id).await?),
    }
}
