use std::collections::HashMap;
use std::env;
use std::fmt::Display;

use lazy_static::lazy_static;

pub type Res<T> = Result<T, String>;

pub trait ErrToStr<T, E: Display> {
    fn err_to_str(self) -> Res<T>;
}

impl<T, E: Display> ErrToStr<T, E> for Result<T, E> {
    fn err_to_str(self) -> Res<T> {
        self.map_err(|err| err.to_string())
    }
}

#[derive(strum_macros::Display, Eq, PartialEq, Debug, Hash, Clone, Copy)]
pub enum DbgFlg {
    #[strum(serialize = "DBG_FLG_LOAD")]
    Load,
    #[strum(serialize = "DBG_FLG_CATALOG")]
    Catalog,
    #[strum(serialize = "DBG_FLG_SUGGEST")]
    Suggest,
    #[strum(serialize = "DBG_FLG_OFFERS")]
    Offers,
}

lazy_static! {
    pub static ref DBG_FLG_DEFAULTS: HashMap<DbgFlg, bool> = HashMap::from([
        (DbgFlg::Load, true),
        (DbgFlg::Catalog, false),
        (DbgFlg::Suggest, false),
        (DbgFlg::Offers, false),
    ]);
}

pub fn log_if(s: &str, flg: DbgFlg) {
    if checkflag(flg) {
        println!("{} {}", utc_now(), s);
    }
}

fn utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

fn checkflag(flg: DbgFlg) -> bool {
    env::var(flg.to_string()).ok().map_or_else(
        || DBG_FLG_DEFAULTS.get(&flg).copied().unwrap_or(false),
        |s| s == "1" || s == "true",
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_flag_env_names() {
        assert_eq!(DbgFlg::Load.to_string(), "DBG_FLG_LOAD");
        assert_eq!(DbgFlg::Offers.to_string(), "DBG_FLG_OFFERS");
    }

    #[test]
    fn test_err_to_str() {
        let parsed: Res<u8> = "x".parse::<u8>().err_to_str();
        assert!(parsed.is_err());
    }
}
