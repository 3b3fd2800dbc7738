// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Names of the standard newsroom events.
//!
//! Reports on the Prezly side group events by these exact strings, so they
//! must not be reworded.

/// Visitor interactions on newsroom pages.
pub mod actions {
	pub const OUTBOUND_LINK_CLICK: &str = "Outbound link click";
	pub const SEARCH: &str = "Search";
	pub const SUBSCRIBE_FORM_SUBMIT: &str = "Subscribe form submit";
	pub const SWITCH_LANGUAGE: &str = "Switch language";
	pub const COPY_STORY_LINK: &str = "Newsroom - Story Page - Copy story link";
	pub const COPY_STORY_TEXT: &str = "Newsroom - Story Page - Copy story text";
	pub const RELATED_STORY_OPEN: &str = "Newsroom - Story Page - Open related story";

	/// Page a story was shared from.
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub enum ShareContext {
		GalleryPage,
		StoryPage,
	}

	impl ShareContext {
		pub fn as_str(&self) -> &'static str {
			match self {
				ShareContext::GalleryPage => "Gallery Page",
				ShareContext::StoryPage => "Story Page",
			}
		}
	}

	pub fn share_story_to_social_network(context: ShareContext) -> String {
		format!(
			"Newsroom - {} - Share story to social network",
			context.as_str()
		)
	}
}

pub mod download {
	pub const ATTACHMENT: &str = "Attachment download";
	pub const GALLERY_IMAGE: &str = "Gallery image download";
	pub const IMAGE: &str = "Image download";
	pub const MEDIA_GALLERY: &str = "Media gallery download";
	pub const STORY_PDF: &str = "Newsroom - Story Page - Download story PDF";
	pub const STORY_ASSETS: &str = "Newsroom - Story Page - Download story assets";
}

pub mod media {
	pub const PLAY: &str = "Media play";
}

pub mod view {
	pub const GALLERY_IMAGE: &str = "Gallery image view";
	pub const IMAGE: &str = "Image view";
}
