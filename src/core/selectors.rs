//! Page elements of the OneUSG timesheet portal and its Georgia Tech login.

/// Identity-provider tile on the SSO chooser.
pub const IDP_LOGO_XPATH: &str = "//*[@id='https_idp_gatech_edu_idp_shibboleth']/div/div/a/img";
pub const USERNAME_NAME: &str = "username";
pub const PASSWORD_NAME: &str = "password";
pub const SUBMIT_NAME: &str = "submitbutton";

/// Second-factor frame; its disappearance means the push was approved.
pub const SECOND_FACTOR_ID: &str = "auth-view-wrapper";
pub const TRUST_BROWSER_ID: &str = "trust-browser-button";

pub const PUNCH_MENU_ID: &str = "TL_RPTD_SFF_WK_GROUPBOX$PIMG";
pub const PUNCH_IN_ID: &str = "TL_RPTD_SFF_WK_TL_ACT_PUNCH1";
pub const PUNCH_OUT_ID: &str = "TL_RPTD_SFF_WK_TL_ACT_PUNCH3";

/// "Already clocked in" confirmation dialog.
pub const DOUBLE_CLOCK_OK_ID: &str = "#ICOK";
pub const DOUBLE_CLOCK_BACK_ID: &str = "PT_WORK_PT_BUTTON_BACK";

pub const SESSION_TIMEOUT_POPUP_ID: &str = "BOR_INSTALL_VW$0_row_0";

pub const STATUS_ID: &str = "TL_WEB_CLOCK_WK_DESCR50_1";
pub const STATUS_ATTRIBUTE: &str = "innerHTML";
pub const STATUS_IN: &str = "In";
pub const STATUS_OUT: &str = "Out";
