//! Review command

use recipes_client::Result;
use recipes_forms::{FieldName, FormDraft, FormType, FormUseCases};

use super::{fill, submit, touch_all, Context};

pub async fn handle(ctx: &Context, recipe_id: u64, rating: u8, comment: String) -> Result<()> {
    let draft = FormDraft::initialize(FormType::Review, None).with_entity_id(recipe_id);
    let controller = ctx.controller(draft);

    controller.change_rating(rating)?;
    fill(&controller, vec![(FieldName::Comment, comment.into())])?;
    touch_all(&controller, FormType::Review)?;

    let body = submit(&controller).await?;
    ctx.format.print(&body);
    Ok(())
}
