/*!
 * Tests for language code utilities
 */

use ezdrama::language_utils::{LanguageCodeType, get_language_name, normalize_to_part1_or_part2t, validate_language_code};

#[test]
fn test_validate_language_code_withDraCorCodes_shouldAcceptThem() {
    assert_eq!(validate_language_code("ger").unwrap(), LanguageCodeType::Part2B);
    assert_eq!(validate_language_code("ukr").unwrap(), LanguageCodeType::Part2T);
    assert_eq!(validate_language_code(" YI ").unwrap(), LanguageCodeType::Part1);
}

#[test]
fn test_validate_language_code_withUnknownCode_shouldFail() {
    assert!(validate_language_code("zz").is_err());
    assert!(validate_language_code("german").is_err());
}

#[test]
fn test_normalize_withBibliographicCode_shouldReturnTwoLetterCode() {
    assert_eq!(normalize_to_part1_or_part2t("fre").unwrap(), "fr");
    assert_eq!(normalize_to_part1_or_part2t("deu").unwrap(), "de");
}

#[test]
fn test_get_language_name_withValidCodes_shouldReturnEnglishName() {
    assert_eq!(get_language_name("uk").unwrap(), "Ukrainian");
    assert_eq!(get_language_name("ger").unwrap(), "German");
    assert!(get_language_name("xx").is_err());
}
