//! snake_case ⇄ camelCase key adapter
//!
//! The registration wire shape uses snake_case keys; the admin form state and
//! the email variables use camelCase. Every translation goes through here.

/// `dinner_attendance` → `dinnerAttendance`
pub fn to_camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for c in snake.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `dinnerAttendance` → `dinner_attendance`
pub fn to_snake_case(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for c in camel.chars() {
        if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("guest_dinner_attendance"), "guestDinnerAttendance");
        assert_eq!(to_camel_case("address_line1"), "addressLine1");
        assert_eq!(to_camel_case("email"), "email");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("guestDinnerAttendance"), "guest_dinner_attendance");
        assert_eq!(to_snake_case("addressLine1"), "address_line1");
    }

    #[test]
    fn test_every_field_key_survives_the_adapter() {
        for spec in crate::REGISTRATION_FIELDS {
            assert_eq!(to_snake_case(&to_camel_case(spec.key)), spec.key);
        }
    }
}
