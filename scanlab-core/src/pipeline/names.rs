//! Output names produced by the standard indicator plan.

pub const EMA_FAST: &str = "ema_fast";
pub const EMA_SLOW: &str = "ema_slow";
pub const EMA_MEDIUM: &str = "ema_medium";
pub const EMA_LONG: &str = "ema_long";

pub const RSI: &str = "rsi";
pub const STOCH: &str = "stoch";
pub const STOCH_K: &str = "stoch_k";
pub const STOCH_D: &str = "stoch_d";
pub const WILLIAMS_R: &str = "williams_r";
pub const MFI: &str = "mfi";

pub const BB: &str = "bb";
pub const BB_UPPER: &str = "bb_upper";
pub const BB_MIDDLE: &str = "bb_middle";
pub const BB_LOWER: &str = "bb_lower";
pub const ATR: &str = "atr";
pub const SUPERTREND_ATR: &str = "supertrend_atr";
pub const KC: &str = "kc";
pub const KC_UPPER: &str = "kc_upper";
pub const KC_LOWER: &str = "kc_lower";
pub const DC: &str = "dc";
pub const DC_UPPER: &str = "dc_upper";
pub const DC_LOWER: &str = "dc_lower";

pub const MACD: &str = "macd";
pub const MACD_SIGNAL: &str = "macd_signal";
pub const MACD_HISTOGRAM: &str = "macd_histogram";
pub const MACD_FAST: &str = "macd_fast";
pub const MACD_FAST_SIGNAL: &str = "macd_fast_signal";
pub const ADX: &str = "adx";
pub const PLUS_DI: &str = "adx_plus_di";
pub const MINUS_DI: &str = "adx_minus_di";
pub const PSAR: &str = "psar";

pub const OBV: &str = "obv";
pub const VWAP: &str = "vwap";
pub const VWMA: &str = "vwma";
pub const CMF: &str = "cmf";
pub const VOLUME: &str = "volume";
pub const VOLUME_AVG: &str = "volume_avg";
pub const VOLUME_RATIO: &str = "volume_ratio";

pub const SUPERTREND: &str = "supertrend";
pub const SUPERTREND_DIRECTION: &str = "supertrend_direction";
pub const ICHIMOKU: &str = "ichimoku";
pub const ICHIMOKU_TENKAN: &str = "ichimoku_tenkan";
pub const ICHIMOKU_KIJUN: &str = "ichimoku_kijun";

pub const PIVOT: &str = "pivot";
pub const PIVOT_R1: &str = "pivot_r1";
pub const PIVOT_S1: &str = "pivot_s1";
pub const RANGE_SHORT: &str = "range_short";
pub const RANGE_SHORT_HIGH: &str = "range_short_high";
pub const RANGE_SHORT_LOW: &str = "range_short_low";
pub const RANGE_LONG: &str = "range_long";
pub const RANGE_LONG_HIGH: &str = "range_long_high";
pub const RANGE_LONG_LOW: &str = "range_long_low";
