//! # Handlers
//!
//! The generic handler builds the baseline record every page gets. Provider
//! handlers gate on signals visible in the page itself (canonical host and
//! path, specific meta tags), check their credentials, and only then call
//! out to the provider's API to enrich the baseline record.
//!
//! | Handler                  | Credential             | Kind      |
//! |--------------------------|------------------------|-----------|
//! | `EtsyProductHandler`     | none                   | `Product` |
//! | `YouTubeVideoHandler`    | `YOUTUBE_API_KEY`      | `Video`   |
//! | `SoundCloudAudioHandler` | `SOUNDCLOUD_CLIENT_ID` | `Audio`   |
//! | `TwitterProfileHandler`  | `TWITTER_BEARER_TOKEN` | `Profile` |
//! | `TwitterStatusHandler`   | `TWITTER_BEARER_TOKEN` | `Status`  |

pub mod api;
mod etsy;
pub mod generic;
mod soundcloud;
mod twitter;
mod youtube;

pub use etsy::EtsyProductHandler;
pub use generic::GenericHandler;
pub use soundcloud::SoundCloudAudioHandler;
pub use twitter::{TwitterProfileHandler, TwitterStatusHandler};
pub use youtube::YouTubeVideoHandler;
