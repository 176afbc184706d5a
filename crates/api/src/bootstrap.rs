//! First-run provisioning.
//!
//! Users can only be created by an admin, so a fresh database needs one seeded
//! account. When `BOOTSTRAP_ADMIN_*` is configured and the users table is
//! empty, startup creates that admin. With `SEED_ROOMS` set, startup also
//! inserts the lodge's standard rooms, skipping any room number already taken.

use lodge_core::roles::ROLE_ADMIN;
use lodge_core::room::RoomCategory;
use lodge_core::types::Money;
use lodge_db::models::room::CreateRoom;
use lodge_db::models::user::CreateUser;
use lodge_db::repositories::{RoomRepo, UserRepo};
use lodge_db::DbPool;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Create the bootstrap admin if no users exist. Returns whether one was created.
pub async fn ensure_admin(pool: &DbPool, admin: Option<&BootstrapAdmin>) -> AppResult<bool> {
    let Some(admin) = admin else {
        return Ok(false);
    };

    if UserRepo::count(pool).await? > 0 {
        tracing::debug!("Users already present, skipping bootstrap admin");
        return Ok(false);
    }

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password_hash,
            first_name: "Lodge".to_string(),
            last_name: "Administrator".to_string(),
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap admin created");
    Ok(true)
}

const ROOM_IMAGE: &str = "interior_room_bedroom.png";

fn room(
    number: &str,
    name: &str,
    category: RoomCategory,
    description: &str,
    capacity: i32,
    cents: i64,
    amenities: &[&str],
) -> CreateRoom {
    CreateRoom {
        name: name.to_string(),
        room_number: number.to_string(),
        room_type: category.as_str().to_string(),
        description: Some(description.to_string()),
        capacity,
        base_price: Money::new(cents, 2),
        amenities: amenities.iter().map(|a| a.to_string()).collect(),
        images: vec![ROOM_IMAGE.to_string()],
    }
}

/// The lodge's three standard rooms.
pub fn room_catalog() -> Vec<CreateRoom> {
    vec![
        room(
            "101",
            "Historic Room 101",
            RoomCategory::Historic,
            "A charming historic room with original lodge character and modern amenities.",
            2,
            14900,
            &["Private Bath", "Historic Charm", "WiFi", "Heating"],
        ),
        room(
            "201",
            "Mountain View Suite 201",
            RoomCategory::MountainView,
            "Spacious suite with stunning mountain views and premium amenities.",
            4,
            19900,
            &["Mountain View", "Private Bath", "Sitting Area", "WiFi", "Mini Fridge"],
        ),
        room(
            "301",
            "Family Cabin 301",
            RoomCategory::FamilyCabin,
            "Large family cabin perfect for groups, with separate sleeping areas.",
            8,
            24900,
            &["Separate Bedrooms", "Full Kitchen", "Living Area", "WiFi", "Fireplace"],
        ),
    ]
}

/// Insert every catalog room whose number is free. Returns how many were added.
pub async fn seed_rooms(pool: &DbPool) -> AppResult<usize> {
    let mut added = 0;
    for input in room_catalog() {
        match RoomRepo::create_if_absent(pool, &input).await? {
            Some(room) => {
                tracing::info!(room_id = room.id, room_number = %room.room_number, "Seeded room");
                added += 1;
            }
            None => {
                tracing::debug!(room_number = %input.room_number, "Room already present, not seeded");
            }
        }
    }
    Ok(added)
}
