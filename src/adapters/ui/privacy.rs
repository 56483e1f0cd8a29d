//! Privacy policy shown before a voter agrees to the terms.

pub const PRIVACY_POLICY: &str = "\
PRIVACY POLICY

This straw poll is an independent survey. It is not affiliated with the
Commission on Elections and its results have no legal effect.

What we collect
  - Your name, contact number and barangay.
  - The candidates you select.

How it is used
  - Your contact number is used only to make sure each person votes once.
  - Published results are aggregate counts per position and per barangay.
    Names and contact numbers are never published.

Your choices
  - Participation is voluntary. You may stop at any time before submitting.
  - Once submitted, a ballot cannot be changed.";
