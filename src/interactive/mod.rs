//
//  bosh-cli
//  interactive/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/09.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Terminal prompts.

pub mod prompt;

pub use prompt::*;
