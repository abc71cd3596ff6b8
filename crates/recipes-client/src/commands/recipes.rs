//! Add and edit recipe commands

use recipes_client::{ClientError, Result};
use recipes_forms::{
    ExistingRecipe, FieldName, FieldValue, FormController, FormDraft, FormType, FormUseCases, ImageFile,
};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use super::{fill, fill_list, submit, touch_all, Context};
use crate::RecipeArgs;

pub async fn add(ctx: &Context, args: RecipeArgs) -> Result<()> {
    let controller = ctx.controller(FormDraft::initialize(FormType::AddRecipe, None));
    apply(&controller, args).await?;
    touch_all(&controller, FormType::AddRecipe)?;

    let body = submit(&controller).await?;
    ctx.format.print(&body);
    Ok(())
}

pub async fn edit(ctx: &Context, id: u64, args: RecipeArgs) -> Result<()> {
    let body = ctx.api.get(&format!("/recipes/{}", id)).await?;
    let recipe = match body {
        Value::Object(ref map) if map.contains_key("recipe") => map["recipe"].clone(),
        other => other,
    };
    let existing: ExistingRecipe =
        serde_json::from_value(recipe).map_err(|e| ClientError::Decode(e.to_string()))?;

    let controller = ctx.controller(FormDraft::initialize(FormType::EditRecipe, Some(&existing)));
    apply(&controller, args).await?;
    touch_all(&controller, FormType::EditRecipe)?;

    let body = submit(&controller).await?;
    ctx.format.print(&body);
    Ok(())
}

async fn apply(controller: &FormController, args: RecipeArgs) -> Result<()> {
    let mut values: Vec<(FieldName, FieldValue)> = Vec::new();
    if let Some(name) = args.name {
        values.push((FieldName::RecipeName, name.into()));
    }
    if let Some(total_time) = args.total_time {
        values.push((FieldName::TotalTime, total_time.into()));
    }
    if let Some(difficulty) = args.difficulty {
        values.push((FieldName::Difficulty, difficulty.into()));
    }
    if let Some(extra_info) = args.extra_info {
        values.push((FieldName::ExtraInfo, extra_info.into()));
    }
    if let Some(vegetarian) = args.vegetarian {
        values.push((FieldName::Vegetarian, vegetarian.into()));
    }
    fill(controller, values)?;

    fill_list(controller, FieldName::Ingredients, &args.ingredients)?;
    fill_list(controller, FieldName::Preparations, &args.preparations)?;
    fill_list(controller, FieldName::Directions, &args.directions)?;

    if let Some(path) = args.image {
        controller.change_image(
            read_image(&path).await?,
            Box::new(|preview| debug!(file = %preview.file_name, bytes = preview.data_url.len(), "image preview ready")),
        )?;
    }
    Ok(())
}

async fn read_image(path: &Path) -> Result<ImageFile> {
    let data = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let content_type = ImageFile::guess_content_type(&file_name).unwrap_or("application/octet-stream");
    Ok(ImageFile::new(file_name, content_type, data))
}
