//! Ownership checks for website-scoped resources.

use ranklens_core::ports::WebsiteRepository;
use ranklens_core::website::Website;
use ranklens_core::{Error, Result, UserId, WebsiteId};

/// Loads a website and verifies the caller owns it.
///
/// Fails closed: an unknown id is `WebsiteNotFound` and a mismatched owner is
/// `WebsiteForbidden`. Callers must run this before touching snapshots or the
/// provider so that a denied request never triggers upstream traffic.
pub async fn authorize_website(
    websites: &dyn WebsiteRepository,
    caller: UserId,
    website_id: WebsiteId,
) -> Result<Website> {
    let website = websites
        .get(website_id)
        .await?
        .ok_or_else(|| Error::WebsiteNotFound(website_id.to_string()))?;

    if website.user_id != caller {
        return Err(Error::WebsiteForbidden(website_id.to_string()));
    }

    Ok(website)
}
