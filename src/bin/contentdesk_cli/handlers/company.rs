#![deny(clippy::all, clippy::pedantic)]

use contentdesk::application::company::CompanyForm;

use crate::args::CompanyCmd;
use crate::client::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: CompanyCmd) -> Result<(), CliError> {
    match cmd {
        CompanyCmd::Show => print_json(&ctx.client.company.fetch().await?),
        CompanyCmd::Save {
            name,
            postal_code,
            address,
            address_detail,
            phone,
            email,
        } => {
            let mut form = CompanyForm::load(&ctx.client.company).await;
            overwrite(&mut form.name, name);
            overwrite(&mut form.postal_code, postal_code);
            overwrite(&mut form.address, address);
            overwrite(&mut form.address_detail, address_detail);
            overwrite(&mut form.phone, phone);
            overwrite(&mut form.email, email);
            let company = form.save(&ctx.client.company, ctx.shell()).await?;
            print_json(&company)
        }
    }
}

fn overwrite(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}
