// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! `OPTION` directive. Only `OPTION LANGUAGE:<convention>` is handled here;
//! it changes the module language independently of `.MODEL`, on any pass.
//! Other options belong to downstream collaborators and pass through.

use super::*;

impl Assembler {
    pub(crate) fn option_directive(&mut self, tokens: &[Token]) -> LineStatus {
        let mut i = 1;
        let Some(name) = tokens[i].ident() else {
            return self.trailing_token_failure(&tokens[i]);
        };
        if !name.eq_ignore_ascii_case("LANGUAGE") {
            return LineStatus::NothingDone;
        }
        i += 1;
        if tokens[i].kind != TokenKind::Colon {
            return self.trailing_token_failure(&tokens[i]);
        }
        i += 1;
        let Some(language) = tokens[i].ident().and_then(language_for) else {
            return self.trailing_token_failure(&tokens[i]);
        };
        i += 1;
        if !tokens[i].is_end() {
            return self.trailing_token_failure(&tokens[i]);
        }
        self.module.language = language;
        LineStatus::Ok
    }
}
