use taskrails::extract::{actionable_instruction, extract_final_instruction};

#[test]
fn instruction_is_trimmed_and_surrounding_noise_ignored() {
    assert_eq!(
        extract_final_instruction(
            "noise <final_prompt>  do the thing  </final_prompt> more noise"
        )
        .as_deref(),
        Some("do the thing")
    );
}

#[test]
fn missing_or_unterminated_blocks_are_absent() {
    assert_eq!(extract_final_instruction("plain reply"), None);
    assert_eq!(extract_final_instruction("<final_prompt>never closed"), None);
    assert_eq!(extract_final_instruction("</final_prompt> then <final_prompt>"), None);
}

#[test]
fn multiline_block_keeps_inner_lines_and_first_block_wins() {
    let response = "Here:\n<final_prompt>\nStep 1\nStep 2\n</final_prompt>\n<final_prompt>other</final_prompt>";
    assert_eq!(
        extract_final_instruction(response).as_deref(),
        Some("Step 1\nStep 2")
    );
}

#[test]
fn whitespace_block_is_not_actionable() {
    assert_eq!(
        extract_final_instruction("<final_prompt>\n \n</final_prompt>").as_deref(),
        Some("")
    );
    assert_eq!(actionable_instruction("<final_prompt>\n \n</final_prompt>"), None);
}
