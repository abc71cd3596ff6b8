//! Login, signup and session commands

use recipes_client::{authenticate_user, session, Result};
use recipes_forms::{FieldName, FieldValue, FormDraft, FormType};

use super::{fill, submit, touch_all, Context};
use crate::SignupArgs;

pub async fn login(ctx: &Context, email: String, password: String) -> Result<()> {
    let controller = ctx.controller(FormDraft::initialize(FormType::Login, None));
    fill(
        &controller,
        vec![(FieldName::Email, email.into()), (FieldName::Password, password.into())],
    )?;
    touch_all(&controller, FormType::Login)?;

    let body = submit(&controller).await?;
    ctx.format.print(body.get("user").unwrap_or(&body));
    Ok(())
}

pub async fn signup(ctx: &Context, args: SignupArgs) -> Result<()> {
    let controller = ctx.controller(FormDraft::initialize(FormType::Signup, None));

    let mut values: Vec<(FieldName, FieldValue)> = vec![
        (FieldName::Firstname, args.firstname.into()),
        (FieldName::Lastname, args.lastname.into()),
        (FieldName::Username, args.username.into()),
        (FieldName::Email, args.email.into()),
        (FieldName::Password, args.password.into()),
        (FieldName::PasswordConfirm, args.password_confirm.into()),
    ];
    if let Some(about_me) = args.about_me {
        values.push((FieldName::AboutMe, about_me.into()));
    }
    if let Some(occupation) = args.occupation {
        values.push((FieldName::Occupation, occupation.into()));
    }
    fill(&controller, values)?;
    touch_all(&controller, FormType::Signup)?;

    let body = submit(&controller).await?;
    ctx.format.print(body.get("user").unwrap_or(&body));
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    let user = authenticate_user(&ctx.api).await?;
    ctx.format.print(&user);
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    session::logout(ctx.tokens.as_ref())?;
    println!("Logged out");
    Ok(())
}
