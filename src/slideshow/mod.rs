//! Slideshow membership and playback settings.
//!
//! The membership table is the canonical model: an ordered, soft-removed
//! set of at most [`SLIDESHOW_CAPACITY`] images rotated as the page
//! background. The `is_slideshow_background` flag on the images table is
//! denormalized from it on every mutation so older read paths keep
//! working.
//!
//! The capacity check reads the active count and then inserts; two
//! concurrent adds can both pass the check. Request handling is
//! single-process and synchronous, so this stays a documented gap rather
//! than an enforced invariant.

use tracing::info;

use crate::db::{SlideshowEntry, SlideshowSettings, Store};
use crate::error::{Error, Result};

/// Most images the slideshow will rotate through.
pub const SLIDESHOW_CAPACITY: i64 = 5;

/// Add an image to the slideshow.
///
/// Re-adding an active member is a no-op. A soft-removed row is
/// reactivated instead of inserting a second membership row. The new
/// member always goes to the end of the rotation.
pub fn add(store: &Store, image_id: i64) -> Result<()> {
    if store.get_image(image_id)?.is_none() {
        return Err(Error::not_found("image", image_id));
    }

    let tx = store.conn.unchecked_transaction()?;

    if let Some((membership_id, is_active)) = store.slideshow_membership(image_id)? {
        if is_active {
            return Ok(());
        }
        check_capacity(store)?;
        let order = store.next_slideshow_order()?;
        store.activate_slideshow_row(membership_id, order)?;
        store.set_slideshow_flag(image_id, true)?;
        tx.commit()?;
        info!("reactivated slideshow membership for image {}", image_id);
        return Ok(());
    }

    check_capacity(store)?;
    let order = store.next_slideshow_order()?;
    store.insert_slideshow_row(image_id, order)?;
    store.set_slideshow_flag(image_id, true)?;
    tx.commit()?;
    info!("added image {} to slideshow at position {}", image_id, order);
    Ok(())
}

fn check_capacity(store: &Store) -> Result<()> {
    let count = store.active_slideshow_count()?;
    if count >= SLIDESHOW_CAPACITY {
        return Err(Error::Capacity(format!(
            "Maximum {SLIDESHOW_CAPACITY} images allowed in slideshow. Remove one first."
        )));
    }
    Ok(())
}

/// Remove an image from the slideshow. Always permitted; removing a
/// non-member is a no-op.
pub fn remove(store: &Store, image_id: i64) -> Result<()> {
    let tx = store.conn.unchecked_transaction()?;
    let removed = store.deactivate_slideshow_for_image(image_id)?;
    store.set_slideshow_flag(image_id, false)?;
    tx.commit()?;
    if removed {
        info!("removed image {} from slideshow", image_id);
    }
    Ok(())
}

/// Rewrite rotation order to match the given membership-id list
/// (1-based positions). Every id must be an active membership row.
pub fn reorder(store: &Store, membership_ids: &[i64]) -> Result<()> {
    let tx = store.conn.unchecked_transaction()?;
    for (position, &id) in membership_ids.iter().enumerate() {
        if !store.set_slideshow_order(id, position as i64 + 1)? {
            return Err(Error::not_found("slideshow entry", id));
        }
    }
    tx.commit()?;
    Ok(())
}

/// Active members in rotation order.
pub fn active(store: &Store) -> Result<Vec<SlideshowEntry>> {
    store.slideshow_entries()
}

/// Playback settings, created with defaults on first read.
pub fn settings(store: &Store) -> Result<SlideshowSettings> {
    if let Some(settings) = store.slideshow_settings_row()? {
        return Ok(settings);
    }
    store.insert_default_slideshow_settings()?;
    Ok(store
        .slideshow_settings_row()?
        .unwrap_or_default())
}

pub fn update_settings(store: &Store, settings: &SlideshowSettings) -> Result<()> {
    // Make sure the singleton exists before patching it
    store.insert_default_slideshow_settings()?;
    store.update_slideshow_settings(settings)
}
