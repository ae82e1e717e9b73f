//
//  bosh-cli
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Directors authenticate users in one of two ways, advertised in
//! `GET /info` under `user_authentication.type`:
//!
//! - **basic**: the client id and secret are sent with every request. This is
//!   handled entirely by [`AuthAdjustment::Basic`](crate::director::AuthAdjustment).
//! - **uaa**: requests carry an OAuth access token issued by UAA. Tokens are
//!   obtained and refreshed by [`AccessTokenSession`], which plugs into the
//!   Director client as its token supplier.
//!
//! ## Module Structure
//!
//! - [`session`]: UAA token session and the tokens it holds

mod session;

pub use session::*;
