//! Wrapper catalog tests
//!
//! Exercises each operation family through the wrapped surface: lifecycle,
//! conversion, construction, table access, iteration, concatenation, and
//! the registration utilities.

mod common;
use common::{num_at, root, str_at};

use std::rc::Rc;

use yue_bridge::{
    aux, wrap, Context, CoStatus, RuntimeError, TypeTag, UnwindStatus, Value,
};

// ===== lifecycle =====

#[test]
fn test_new_thread_shares_runtime() {
    let c = root();
    let child = wrap::new_thread(&c).unwrap();
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Clean);
    assert!(!child.is_root());
    assert!(matches!(c.value_at(-1), Value::Thread(_)));

    // the child's wrapped calls write the shared status register
    child.push_boolean(true);
    child.push_nil();
    wrap::get_table(&child, -2);
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Failed);
}

#[test]
fn test_reset_thread_restores_idle_shape() {
    let c = root();
    let child = wrap::new_thread(&c).unwrap();
    child.push_number(1.0);
    wrap::break_ctx(&child);

    wrap::reset_thread(&child);
    assert!(child.is_reset());
    assert_eq!(child.top(), 0);
    assert_eq!(child.status(), CoStatus::Suspended);
}

#[test]
fn test_break_requests_cooperative_interrupt() {
    let c = root();
    assert_eq!(wrap::break_ctx(&c), wrap::BREAK);
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Clean);
    assert!(c.interrupt_requested());
}

// ===== conversion =====

#[test]
fn test_to_lstring_converts_numbers_in_place() {
    let c = root();
    c.push_number(12.0);
    let s = wrap::to_lstring(&c, 1).unwrap();
    assert_eq!(s.as_bytes(), b"12");
    assert_eq!(c.value_at(1).type_tag(), TypeTag::String);

    // non-coercible values yield nothing with a clean status
    c.push_boolean(true);
    assert!(wrap::to_lstring(&c, 2).is_none());
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Clean);
}

#[test]
fn test_obj_len_per_type() {
    let c = root();
    wrap::push_lstring(&c, b"hello");
    assert_eq!(wrap::obj_len(&c, 1), 5);

    wrap::create_table(&c, 0, 0);
    c.push_number(10.0);
    wrap::raw_set_i(&c, 2, 1);
    c.push_number(20.0);
    wrap::raw_set_i(&c, 2, 2);
    assert_eq!(wrap::obj_len(&c, 2), 2);

    wrap::new_buffer(&c, 32).unwrap();
    assert_eq!(wrap::obj_len(&c, 3), 32);

    c.push_boolean(true);
    assert_eq!(wrap::obj_len(&c, 4), 0);
}

// ===== construction =====

fn greet(ctx: &Context) -> i32 {
    ctx.push(Value::String("hi".into()));
    1
}

#[test]
fn test_push_closure_and_clone_function() {
    let c = root();
    c.push_number(1.0);
    wrap::push_closure(&c, greet, Some("greet"), 1);
    assert_eq!(c.top(), 1);

    wrap::clone_function(&c, 1);
    assert_eq!(c.top(), 2);
    match (c.value_at(1), c.value_at(2)) {
        (Value::Function(a), Value::Function(b)) => {
            assert!(!Rc::ptr_eq(&a, &b));
            assert_eq!(a.upvalues.len(), b.upvalues.len());
        }
        _ => panic!("expected two functions"),
    }

    // cloning a non-function traps
    c.push_nil();
    wrap::clone_function(&c, 3);
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Failed);
    assert_eq!(yue_bridge::last_error(&c), Some(RuntimeError::NotFunction));
}

#[test]
fn test_userdata_construction_paths() {
    let c = root();
    let ud = wrap::new_userdata_tagged(&c, 16, 3).unwrap();
    assert_eq!(ud.borrow().len(), 16);
    assert_eq!(ud.borrow().data().iter().filter(|&&b| b != 0).count(), 0);

    // out-of-range tag -> sentinel
    let limit = c.runtime().config().userdata_tag_limit;
    assert!(wrap::new_userdata_tagged(&c, 16, limit).is_none());
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Failed);

    // tag metatable must be registered before the tagged-with-metatable form
    assert!(wrap::new_userdata_tagged_with_metatable(&c, 8, 7).is_none());
    assert_eq!(
        yue_bridge::last_error(&c),
        Some(RuntimeError::MissingTagMetatable(7))
    );
}

#[test]
fn test_buffer_construction_and_cap() {
    let c = root();
    let b = wrap::new_buffer(&c, 64).unwrap();
    b.borrow_mut()[0] = 0xFF;
    assert_eq!(c.value_at(-1).type_tag(), TypeTag::Buffer);

    let cap = c.runtime().config().max_buffer_size;
    assert!(wrap::new_buffer(&c, cap + 1).is_none());
    assert_eq!(
        yue_bridge::last_error(&c),
        Some(RuntimeError::BufferTooBig(cap + 1))
    );
}

// ===== table access =====

#[test]
fn test_set_table_and_get_table_round() {
    let c = root();
    wrap::create_table(&c, 0, 2);
    wrap::push_lstring(&c, b"k");
    c.push_number(3.0);
    wrap::set_table(&c, 1);
    assert_eq!(c.top(), 1);

    wrap::push_lstring(&c, b"k");
    assert_eq!(wrap::get_table(&c, 1), TypeTag::Number);
    assert_eq!(num_at(&c, -1), 3.0);
}

#[test]
fn test_raw_writes_skip_newindex() {
    fn reject(_ctx: &Context) -> i32 {
        0
    }
    let c = root();
    wrap::create_table(&c, 0, 0); // 1: target
    wrap::create_table(&c, 0, 0); // 2: metatable
    wrap::push_closure(&c, reject, Some("reject"), 0);
    wrap::set_field(&c, 2, "__newindex");
    assert!(wrap::set_metatable(&c, 1));

    // metatable-aware write is diverted to the handler, which drops it
    wrap::push_lstring(&c, b"a");
    c.push_number(1.0);
    wrap::set_table(&c, 1);
    assert_eq!(wrap::get_field(&c, 1, "a"), TypeTag::Nil);
    c.pop();

    // raw write lands in the table itself
    c.push_number(2.0);
    wrap::raw_set_field(&c, 1, "a");
    assert_eq!(wrap::get_field(&c, 1, "a"), TypeTag::Number);
}

#[test]
fn test_readonly_table_write_traps() {
    let c = root();
    wrap::create_table(&c, 0, 0);
    match c.value_at(1) {
        Value::Table(t) => t.borrow_mut().set_readonly(true),
        _ => unreachable!(),
    }
    c.push_number(1.0);
    wrap::raw_set_field(&c, 1, "x");
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Failed);
    assert_eq!(yue_bridge::last_error(&c), Some(RuntimeError::ReadonlyTable));
    // the trapped write left the call's argument untouched
    assert_eq!(c.top(), 2);
}

#[test]
fn test_nil_key_write_traps() {
    let c = root();
    wrap::create_table(&c, 0, 0);
    c.push_nil();
    c.push_number(1.0);
    wrap::set_table(&c, 1);
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Failed);
    assert_eq!(yue_bridge::last_error(&c), Some(RuntimeError::NilKey));
}

#[test]
fn test_clear_and_clone_table() {
    let c = root();
    wrap::create_table(&c, 0, 0);
    c.push_number(1.0);
    wrap::raw_set_field(&c, 1, "a");

    wrap::clone_table(&c, 1);
    match (c.value_at(1), c.value_at(2)) {
        (Value::Table(orig), Value::Table(copy)) => {
            assert!(!Rc::ptr_eq(&orig, &copy));
            copy.borrow_mut().set_field("b", Value::Number(2.0)).unwrap();
            assert!(orig.borrow().get_field("b").is_nil());
        }
        _ => panic!("expected two tables"),
    }

    wrap::clear_table(&c, 1);
    assert_eq!(wrap::get_field(&c, 1, "a"), TypeTag::Nil);
    // the clone keeps its entries
    c.pop();
    assert_eq!(wrap::get_field(&c, 2, "a"), TypeTag::Number);
}

#[test]
fn test_set_metatable_on_non_container_traps() {
    let c = root();
    c.push_number(1.0);
    wrap::create_table(&c, 0, 0);
    assert!(!wrap::set_metatable(&c, 1));
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Failed);
    assert_eq!(
        yue_bridge::last_error(&c),
        Some(RuntimeError::BadMetatableTarget("number"))
    );
}

// ===== iteration =====

#[test]
fn test_next_walks_array_then_hash() {
    let c = root();
    wrap::create_table(&c, 2, 1);
    c.push_number(10.0);
    wrap::raw_set_i(&c, 1, 1);
    c.push_number(20.0);
    wrap::raw_set_i(&c, 1, 2);
    c.push_boolean(true);
    wrap::raw_set_field(&c, 1, "flag");

    let mut seen = 0;
    c.push_nil();
    while wrap::next(&c, 1) {
        seen += 1;
        // drop the value, keep the key for the following step
        c.pop();
    }
    assert_eq!(seen, 3);
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Clean);
    // an exhausted traversal pops the key and pushes nothing
    assert_eq!(c.top(), 1);
}

#[test]
fn test_next_with_foreign_key_traps() {
    let c = root();
    wrap::create_table(&c, 0, 0);
    c.push_number(1.0);
    wrap::raw_set_field(&c, 1, "a");

    wrap::push_lstring(&c, b"never-inserted");
    assert!(!wrap::next(&c, 1));
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Failed);
    assert_eq!(
        yue_bridge::last_error(&c),
        Some(RuntimeError::InvalidIterKey)
    );
}

// ===== string assembly =====

#[test]
fn test_concat_coerces_numbers() {
    let c = root();
    wrap::push_lstring(&c, b"n=");
    c.push_number(4.0);
    wrap::concat(&c, 2);
    assert_eq!(c.top(), 1);
    assert_eq!(str_at(&c, 1), "n=4");
}

#[test]
fn test_concat_bad_operand_traps_with_operands_intact() {
    let c = root();
    wrap::push_lstring(&c, b"x");
    c.push_boolean(false);
    wrap::concat(&c, 2);
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Failed);
    assert_eq!(c.top(), 2);
}

// ===== registration utilities =====

#[test]
fn test_new_metatable_and_check_udata() {
    let c = root();
    assert!(aux::new_metatable(&c, "Widget"));
    assert!(!aux::new_metatable(&c, "Widget"));

    let ud = wrap::new_userdata_tagged(&c, 4, 0).unwrap();
    let mt = match c.value_at(1) {
        Value::Table(t) => t,
        _ => unreachable!(),
    };
    ud.borrow_mut().set_metatable(Some(mt));

    let got = aux::check_udata(&c, 3, "Widget").unwrap();
    assert!(Rc::ptr_eq(&got, &ud));
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Clean);

    // a name with no registered metatable is the standard type failure
    assert!(aux::check_udata(&c, 3, "Gadget").is_none());
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Failed);
}

#[test]
fn test_find_table_builds_and_reports_conflicts() {
    let c = root();
    wrap::create_table(&c, 0, 0);
    assert_eq!(aux::find_table(&c, 1, "net.http.client", 0), None);
    assert_eq!(c.value_at(-1).type_tag(), TypeTag::Table);
    c.pop();

    // the built path persists
    assert_eq!(wrap::get_field(&c, 1, "net"), TypeTag::Table);
    c.pop();

    // a leaf occupied by a non-table reports the offending component
    c.push_number(1.0);
    wrap::set_field(&c, 1, "version");
    assert_eq!(
        aux::find_table(&c, 1, "version.detail", 0),
        Some("version".to_owned())
    );
}

#[test]
fn test_to_lstring_meta_consults_handler() {
    fn render(ctx: &Context) -> i32 {
        ctx.push(Value::String("widget!".into()));
        1
    }
    let c = root();
    wrap::new_userdata_tagged(&c, 4, 0).unwrap(); // 1: userdata
    wrap::create_table(&c, 0, 0); // 2: metatable
    wrap::push_closure(&c, render, Some("render"), 0);
    wrap::set_field(&c, 2, "__tostring");
    assert!(wrap::set_metatable(&c, 1));

    let s = aux::to_lstring_meta(&c, 1).unwrap();
    assert_eq!(s.as_bytes(), b"widget!");
    assert_eq!(str_at(&c, -1), "widget!");
}

#[test]
fn test_type_name_reports_no_value_past_top() {
    let c = root();
    c.push_boolean(true);
    assert_eq!(aux::type_name(&c, 1), "boolean");
    assert_eq!(aux::type_name(&c, 5), "no value");
}

#[test]
fn test_type_name_overwrites_stale_failed_status() {
    let c = root();
    c.push_boolean(true);
    c.push_nil();
    wrap::get_table(&c, -2);
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Failed);

    // a wrapped query writes its own clean outcome, like every entry
    assert_eq!(aux::type_name(&c, 1), "boolean");
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Clean);
}

#[test]
fn test_set_lightuserdata_name_bounds() {
    let c = root();
    wrap::set_lightuserdata_name(&c, 2, "FileHandle");
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Clean);
    assert_eq!(
        c.runtime().light_name(2).map(|s| s.as_bytes().to_vec()),
        Some(b"FileHandle".to_vec())
    );

    let limit = c.runtime().config().light_userdata_tag_limit;
    wrap::set_lightuserdata_name(&c, limit, "TooFar");
    assert_eq!(yue_bridge::unwind_status(&c), UnwindStatus::Failed);
    assert_eq!(
        yue_bridge::last_error(&c),
        Some(RuntimeError::InvalidTag(limit))
    );
}
