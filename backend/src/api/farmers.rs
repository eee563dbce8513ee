use axum::{extract::State, http::StatusCode, Json};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use super::extract::{AppJson, AppPath, AppQuery};
use crate::{
    cpf::Cpf,
    error::{AppError, Result},
    models::{
        common::Paginated,
        farmer::{CreateFarmerRequest, Farmer, FarmerListParams, UpdateFarmerRequest},
    },
    repo::{DeleteOutcome, FarmerStore},
};

pub async fn list(
    State(farmers): State<FarmerStore>,
    AppQuery(params): AppQuery<FarmerListParams>,
) -> Result<Json<Paginated<Farmer>>> {
    params.validate()?;

    let page = params.page_request()?;
    let filter = params.filter();
    tracing::debug!(
        page = page.page(),
        limit = page.limit(),
        filtered = !filter.is_empty(),
        "Listing farmers"
    );
    let (rows, total) = farmers.list(&filter, &page).await?;

    Ok(Json(Paginated::new(rows, &page, total)))
}

pub async fn get_one(
    State(farmers): State<FarmerStore>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Farmer>> {
    let farmer = load(&farmers, id).await?;
    Ok(Json(farmer))
}

pub async fn get_by_cpf(
    State(farmers): State<FarmerStore>,
    AppPath(raw): AppPath<String>,
) -> Result<Json<Farmer>> {
    let cpf = Cpf::parse(&raw)?;
    let farmer = farmers
        .find_by_cpf(&cpf)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No farmer registered with CPF {}", cpf.formatted()))
        })?;

    Ok(Json(farmer))
}

pub async fn create(
    State(farmers): State<FarmerStore>,
    AppJson(req): AppJson<CreateFarmerRequest>,
) -> Result<(StatusCode, Json<Farmer>)> {
    req.validate()?;

    let now = OffsetDateTime::now_utc();
    let fields = req.into_new_farmer(now.date())?;

    // Fast path only; the store's unique constraint is authoritative.
    if farmers.find_by_cpf(&fields.cpf).await?.is_some() {
        return Err(AppError::Conflict(
            "A farmer with this CPF already exists".into(),
        ));
    }

    let farmer = farmers.insert(&Farmer::new(fields, now)).await?;
    tracing::info!(farmer_id = %farmer.id, "Farmer created");

    Ok((StatusCode::CREATED, Json(farmer)))
}

pub async fn update(
    State(farmers): State<FarmerStore>,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateFarmerRequest>,
) -> Result<Json<Farmer>> {
    req.validate()?;

    let now = OffsetDateTime::now_utc();
    let changes = req.into_changes(now.date())?;

    let mut farmer = load(&farmers, id).await?;
    farmer.apply(changes, now);
    let farmer = save(&farmers, &farmer).await?;
    tracing::info!(farmer_id = %farmer.id, "Farmer updated");

    Ok(Json(farmer))
}

pub async fn activate(
    State(farmers): State<FarmerStore>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Farmer>> {
    let mut farmer = load(&farmers, id).await?;
    farmer.activate(OffsetDateTime::now_utc());
    let farmer = save(&farmers, &farmer).await?;
    tracing::info!(farmer_id = %farmer.id, "Farmer activated");

    Ok(Json(farmer))
}

pub async fn deactivate(
    State(farmers): State<FarmerStore>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Farmer>> {
    let mut farmer = load(&farmers, id).await?;
    farmer.deactivate(OffsetDateTime::now_utc());
    let farmer = save(&farmers, &farmer).await?;
    tracing::info!(farmer_id = %farmer.id, "Farmer deactivated");

    Ok(Json(farmer))
}

pub async fn delete(
    State(farmers): State<FarmerStore>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode> {
    match farmers.delete(id).await? {
        DeleteOutcome::Deleted => {
            tracing::info!(farmer_id = %id, "Farmer deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        DeleteOutcome::StillActive => Err(AppError::BadRequest(
            "Cannot delete an active farmer. Deactivate it first.".into(),
        )),
        DeleteOutcome::NotFound => Err(AppError::NotFound("Farmer not found".into())),
    }
}

async fn load(farmers: &FarmerStore, id: Uuid) -> Result<Farmer> {
    farmers
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Farmer not found".into()))
}

async fn save(farmers: &FarmerStore, farmer: &Farmer) -> Result<Farmer> {
    farmers
        .update(farmer)
        .await?
        .ok_or_else(|| AppError::NotFound("Farmer not found".into()))
}
